use crate::schedules::repo_types::Schedule;

pub struct ReminderMessage {
    pub subject: String,
    pub body: String,
}

pub fn compose(s: &Schedule) -> ReminderMessage {
    let subject = format!(
        "Reminder: {}'s Vaccination is on {}",
        s.pet_name, s.vaccination_date
    );
    let body = format!(
        "Hello!\n\n\
         This is a reminder for your pet's vaccination.\n\n\
         Pet Name: {}\n\
         Vaccine: {}\n\
         Vaccination Date: {}\n\
         Reminder Time: {} on {}\n\n\
         Take care of your pet!",
        s.pet_name, s.vaccine_name, s.vaccination_date, s.reminder_time, s.reminder_date
    );
    ReminderMessage { subject, body }
}

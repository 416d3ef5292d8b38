//! Console front-end for the walk-in clinic appointment system.
//!
//! Patients and staff book and cancel through numbered menus; the whole
//! system can be saved to and loaded from a JSON file.

use clinic_waitlist::{
    format_hour, logger, AppConfig, AppointmentSystem, Booking, ConfigError, EventLog, JsonStore,
    StudentNumber,
};
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

struct ClinicCli {
    system: AppointmentSystem,
    store: JsonStore,
    running: bool,
}

impl ClinicCli {
    fn new(config: AppConfig, events: Arc<EventLog>) -> Self {
        let system = AppointmentSystem::new(config.clinic_name, config.allocator, events);
        let store = JsonStore::new(config.store_path);
        ClinicCli {
            system,
            store,
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       {}", self.system.name().to_uppercase());
        let day = self.system.config();
        println!(
            "       Appointments {} - {}",
            format_hour(day.base_hour),
            format_hour(day.closing_hour())
        );
        println!("{}", "=".repeat(60));
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. I am a patient");
        println!("2. I am a staff member");
        println!("3. Exit");
        println!("4. Save appointment system to file");
        println!("5. Load appointment system from file");
        println!("{}", "-".repeat(20));
    }

    /// Read one trimmed line. Returns `None` and stops the loop at end of input.
    fn get_input(&mut self, prompt: &str) -> Option<String> {
        print!("{}: ", prompt);
        let _ = io::stdout().flush();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => {
                self.running = false;
                None
            }
            Ok(_) => Some(input.trim().to_string()),
        }
    }

    fn get_int_input(&mut self, prompt: &str) -> Option<i32> {
        loop {
            let input = self.get_input(prompt)?;
            if let Ok(value) = input.parse::<i32>() {
                return Some(value);
            }
            println!("Please enter a valid number");
        }
    }

    fn get_student_number(&mut self) -> Option<StudentNumber> {
        loop {
            let input = self.get_input("8 digit student number")?;
            match StudentNumber::parse(&input) {
                Ok(sn) => return Some(sn),
                Err(e) => println!("{}", e),
            }
        }
    }

    fn run_patient(&mut self) {
        println!("\n--- Patient ---");
        println!("1. Book an appointment");
        println!("2. Cancel an appointment");
        println!("3. Cancel a wait list position");
        println!("4. View wait list position");

        match self.get_int_input("Select option") {
            Some(1) => self.book_appointment(),
            Some(2) => self.cancel_appointment(),
            Some(3) => self.cancel_waitlist(),
            Some(4) => self.view_waitlist_position(),
            Some(_) => println!("Invalid selection. Please try again."),
            None => {}
        }
    }

    fn run_staff(&mut self) {
        println!("\n--- Staff ---");
        println!("{}", self.system);
        println!("1. Book an appointment");
        println!("2. Cancel an appointment");
        println!("3. Remove a student from the wait list");
        println!("4. View a student's appointment time");
        println!("5. View a student's wait list position");
        println!("6. View appointment list or wait list");

        match self.get_int_input("Select option") {
            Some(1) => self.book_appointment(),
            Some(2) => self.cancel_appointment(),
            Some(3) => self.cancel_waitlist(),
            Some(4) => self.view_appointment_time(),
            Some(5) => self.view_waitlist_position(),
            Some(6) => self.view_lists(),
            Some(_) => println!("Invalid selection. Please try again."),
            None => {}
        }
    }

    fn book_appointment(&mut self) {
        let Some(student_number) = self.get_student_number() else {
            return;
        };

        match self.system.book_appointment(student_number) {
            Booking::Booked { hour, .. } => {
                println!("\nYou have been booked at: {}", format_hour(hour));
            }
            Booking::Waitlisted { position } => {
                println!("\nSorry, the appointment system is full, but you are added to the wait list");
                if let Some(answer) = self.get_input("View your wait list position? (yes/no)") {
                    if answer.eq_ignore_ascii_case("yes") {
                        println!("Your wait list position is at: {}", position);
                    }
                }
            }
        }
    }

    fn cancel_appointment(&mut self) {
        let Some(student_number) = self.get_student_number() else {
            return;
        };

        if self.system.cancel_appointment(student_number) {
            println!("\nSuccessfully removed patient from appointment system");
        } else {
            println!("\nSorry, we cannot find this patient");
        }
    }

    fn cancel_waitlist(&mut self) {
        let Some(student_number) = self.get_student_number() else {
            return;
        };

        if self.system.cancel_waitlist(student_number) {
            println!("\nSuccessfully removed patient from wait list");
        } else {
            println!("\nSorry, we cannot find this patient");
        }
    }

    fn view_appointment_time(&mut self) {
        let Some(student_number) = self.get_student_number() else {
            return;
        };

        match self.system.appointment_time(student_number) {
            Some(hour) => println!("\nTime: {}", format_hour(hour)),
            None => println!("\nSorry, we cannot find this patient."),
        }
    }

    fn view_waitlist_position(&mut self) {
        let Some(student_number) = self.get_student_number() else {
            return;
        };

        match self.system.waitlist_position(student_number) {
            Some(position) => println!("\nYour wait list position is at: {}", position),
            None => println!("\nSorry, we cannot find this patient."),
        }
    }

    fn view_lists(&mut self) {
        println!("1. View the appointment list");
        println!("2. View the wait list");

        match self.get_int_input("Select option") {
            Some(1) => {
                if self.system.is_empty() {
                    println!("\nSorry, appointment system is empty");
                    return;
                }
                println!("\n--- Appointments ({} slots) ---", self.system.appointment_count());
                for (hour, sn) in self.system.appointments() {
                    println!("  {}  Student number: {}", format_hour(hour), sn);
                }
            }
            Some(2) => {
                if self.system.waitlist_is_empty() {
                    println!("\nSorry, wait list is empty");
                    return;
                }
                println!("\n--- Wait List ({}) ---", self.system.waitlist_count());
                for (position, sn) in self.system.waitlist() {
                    println!("  {:>3}. Student number: {}", position, sn);
                }
            }
            Some(_) => println!("Invalid selection. Please try again."),
            None => {}
        }
    }

    fn save(&self) {
        match self.store.save(&self.system) {
            Ok(()) => println!(
                "\nSaved {} to {}",
                self.system.name(),
                self.store.path().display()
            ),
            Err(e) => {
                log::warn!("save failed: {}", e);
                println!("\nUnable to write to file: {}", self.store.path().display());
            }
        }
    }

    fn load(&mut self) {
        match self.store.reload(&mut self.system) {
            Ok(()) => {
                log::info!("now serving {}", self.system);
                println!(
                    "\nLoaded {} from {}",
                    self.system.name(),
                    self.store.path().display()
                );
            }
            Err(e) => {
                log::warn!("load failed: {}", e);
                println!("\nUnable to read from file: {}", self.store.path().display());
            }
        }
    }

    fn run(&mut self) {
        self.print_header();

        while self.running {
            self.print_menu();

            match self.get_int_input("Enter choice") {
                Some(1) => self.run_patient(),
                Some(2) => self.run_staff(),
                Some(3) => self.running = false,
                Some(4) => self.save(),
                Some(5) => self.load(),
                Some(_) => println!("\nOops, invalid selection, please try again"),
                None => {}
            }
        }

        println!("\nBye Bye");
    }
}

fn print_events_on_exit(events: &EventLog) {
    println!("Events logged:");
    for event in events.drain() {
        println!("{}", event);
    }
    println!("End of events");
}

fn main() {
    if let Err(err) = run() {
        eprintln!("clinic-waitlist failed: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    logger::init(config.log_level)?;
    log::info!(
        "starting {} with {} slots from {}",
        config.clinic_name,
        config.allocator.capacity,
        format_hour(config.allocator.base_hour)
    );

    let events = Arc::new(EventLog::new());
    let mut cli = ClinicCli::new(config, events.clone());
    cli.run();

    print_events_on_exit(&events);
    Ok(())
}

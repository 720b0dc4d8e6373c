use colored::Colorize;
use tabled::{Table, Tabled};

use tpabridge_core::HospitalRecord;

pub fn print_success(message: &str) {
    println!("{} {message}", "OK".green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", "ERROR".red().bold());
}

#[derive(Tabled)]
struct HospitalLine {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Pincode")]
    pincode: String,
    #[tabled(rename = "Phone")]
    phone: String,
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".into())
}

pub fn print_hospitals(records: &[HospitalRecord]) {
    if records.is_empty() {
        println!("No hospitals matched.");
        return;
    }
    let lines: Vec<HospitalLine> = records
        .iter()
        .map(|record| HospitalLine {
            name: cell(&record.name),
            address: cell(&record.address_line1),
            city: cell(&record.city),
            state: cell(&record.state),
            pincode: cell(&record.pincode),
            phone: cell(&record.phone),
        })
        .collect();
    println!("{}", Table::new(lines));
}

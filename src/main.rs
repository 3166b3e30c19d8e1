use std::process;
use taskweave::ui::Ui;

fn main() {
    if let Err(e) = taskweave::cli::run() {
        Ui::default().error(&format!("{:#}", e));
        process::exit(1);
    }
}

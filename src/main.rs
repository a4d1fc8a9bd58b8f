use std::process::ExitCode;

fn main() -> ExitCode {
    match add_xcodeproj::cli_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            println!("error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}

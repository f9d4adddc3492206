use std::process::ExitCode;

use clap::Parser;
use insightdesk::{Cli, run};

fn main() -> ExitCode {
    // `insightdesk list | head` or `export | less` may close stdout early;
    // die quietly on SIGPIPE instead of panicking on the failed write.
    #[cfg(unix)]
    restore_default_sigpipe();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(unix)]
fn restore_default_sigpipe() {
    // SAFETY: called once at startup before any other thread exists.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

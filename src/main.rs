use std::env;
use std::process;

use rax_ftp_transfer::terminal::Terminal;
use rax_ftp_transfer::{ClientConfig, RaxFtpClient};

fn main() {
    // Initialize logging
    env_logger::init();

    // Defaults, then rax-ftp-transfer.toml, then RAX_FTP_* variables
    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    let mut client = RaxFtpClient::new(config);
    if let Err(e) = client.connect_configured() {
        eprintln!("Failed to connect: {}", e);
        process::exit(1);
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let mut terminal = Terminal::new(client);
    let result = if args.is_empty() {
        terminal.run_interactive()
    } else {
        terminal.run_once(&args)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn print_usage() {
    println!("RAX FTP Transfer");
    println!("Usage: rax-ftp-transfer [ls [-R] <path> | get <remote> [local] | put <local> [remote]]");
    println!("Environment Variables:");
    println!("  RAX_FTP_HOST=ftp.example.org");
    println!("  RAX_FTP_PORT=21");
    println!("  RAX_FTP_USERNAME=anonymous");
    println!("  RAX_FTP_PASSWORD=secret");
    println!("  RAX_FTP_LOCAL_DIRECTORY=\"./downloads\"");
    println!("  RUST_LOG=info");
}

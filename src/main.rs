//! Host-side preview helper: `cargo run` builds the wasm package into
//! `static/pkg` and serves `static/` locally.
//!
//! `PREVIEW_PORT` picks the port (default 8000). `PREVIEW_TUNNEL=1` also
//! starts an ngrok tunnel when ngrok is installed.

use std::process::{Command, ExitCode, Stdio};
use std::{env, thread, time::Duration};

const DEFAULT_PORT: u16 = 8000;

fn port() -> u16 {
    env::var("PREVIEW_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn build_pkg() -> bool {
    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
    {
        Ok(st) if st.success() => true,
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            false
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Serving whatever is already in static/pkg.");
            true
        }
    }
}

fn main() -> ExitCode {
    if !build_pkg() {
        return ExitCode::FAILURE;
    }

    let port = port();
    println!("Launching local server at http://127.0.0.1:{port} …");
    let server = Command::new("python3")
        .args(["-m", "http.server", &port.to_string(), "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    if let Err(err) = server {
        eprintln!("failed to start http server: {err}");
        return ExitCode::FAILURE;
    }

    if env::var("PREVIEW_TUNNEL").as_deref() == Ok("1") {
        match Command::new("ngrok").args(["http", &port.to_string()]).spawn() {
            Ok(_) => println!("ngrok tunnel starting …"),
            Err(_) => {
                eprintln!("ngrok not found. Install it to expose the preview over the internet.")
            }
        }
    }

    // Keep process alive
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

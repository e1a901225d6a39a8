use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hidpad::backends::{hid::HidApiTransport, probe_gamepads};
use hidpad::{Session, SessionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Optional TOML config as the first argument.
    let config = match std::env::args().nth(1) {
        Some(path) => SessionConfig::from_path(path)?,
        None => SessionConfig::default(),
    };

    let transport = Arc::new(HidApiTransport);
    let pads = probe_gamepads(transport.as_ref(), &config.product_filter)?;
    if pads.is_empty() {
        println!("Unable to find gamepad devices.");
        return Ok(());
    }

    println!("Available gamepads:");
    for (i, pad) in pads.iter().enumerate() {
        println!("  {i} - {pad}");
    }
    print!("Select a gamepad: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let choice: usize = line.trim().parse()?;
    let Some(pad) = pads.get(choice) else {
        println!("No gamepad #{choice}.");
        return Ok(());
    };

    let session = Session::with_config(transport, &config);
    session.connect(pad)?;
    println!("Connected, model {}. Printing decoded state.", session.model());
    session.start_asynchronous()?;

    loop {
        if session.is_connected() {
            println!("{}", session.snapshot().to_json()?);
            thread::sleep(config.poll_period());
        } else {
            if let Err(err) = session.reconnect() {
                println!("Reconnect failed: {err}");
            }
            thread::sleep(Duration::from_secs(2));
        }
    }
}

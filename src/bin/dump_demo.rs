use std::env;
use std::fs::File;
use std::io::BufReader;

use vadrigar::DemoReader;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <demo.dm_73>", args[0]);
        eprintln!("Dumps the demo's event stream as JSON lines:");
        eprintln!("  - Gamestate: command sequence, client slot, checksum feed");
        eprintln!("  - ServerCommand: reliable command strings (chat, configstrings, scores)");
        eprintln!("  - Snapshot: server time, delta source, flags, area mask");
        std::process::exit(1);
    }

    let file = File::open(&args[1])?;
    let mut reader = DemoReader::new(BufReader::new(file));

    let mut events = 0u64;
    while let Some(event) = reader.next_event()? {
        println!("{}", serde_json::to_string(&event)?);
        events += 1;
    }

    let state = reader.state();
    eprintln!(
        "{} events ({} no-ops); {} live entities, {} baselines, {} configstrings",
        events,
        reader.nop_count(),
        state.entities.len(),
        state.baselines.len(),
        state.config.len()
    );

    Ok(())
}

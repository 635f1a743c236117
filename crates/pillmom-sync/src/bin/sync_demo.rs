//! # Sync Demo
//!
//! Opens a store, writes a medication with a reminder and lists what is
//! there. With `--remote` the store is an embedded replica configured from
//! the environment (or `.env`), and the demo waits for a background sync.
//!
//! ## Usage
//! ```bash
//! # Local file (default ./pillmom_dev.db)
//! cargo run -p pillmom-sync --bin sync-demo
//!
//! # Custom path
//! cargo run -p pillmom-sync --bin sync-demo -- --db ./data/pillmom.db
//!
//! # Embedded replica (TURSO_DATABASE_URL / TURSO_AUTH_TOKEN)
//! cargo run -p pillmom-sync --bin sync-demo -- --remote --interval 5
//! ```

use std::env;
use std::time::Duration;

use chrono::Local;
use pillmom_core::{Medication, Reminder};
use pillmom_db::DbConfig;
use pillmom_sync::{init_tracing, Session, SyncConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./pillmom_dev.db");
    let mut remote = false;
    let mut interval: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--remote" | "-r" => remote = true,
            "--interval" | "-i" => {
                if i + 1 < args.len() {
                    interval = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("PillMom Sync Demo");
                println!();
                println!("Usage: sync-demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Local database file (default: ./pillmom_dev.db)");
                println!("  -r, --remote           Open an embedded replica from TURSO_* env vars");
                println!("  -i, --interval <SECS>  Background sync period for --remote");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut session = Session::new();

    if remote {
        let mut config = SyncConfig::from_env()?;
        if let Some(secs) = interval {
            config = config.with_interval(Duration::from_secs(secs));
        }
        println!("Replica: {} -> {}", config.remote_url, config.replica_path.display());
        println!("Sync every {:?}", config.sync_interval);
        session.open_replica(config.to_replica_config()).await?;
    } else {
        println!("Database: {}", db_path);
        session.open_local(DbConfig::new(&db_path)).await?;
    }
    println!("✓ Store open, schema ensured");

    let stamp = Local::now().format("%H:%M:%S");
    let mut med = Medication::new(format!("Demo Aspirin {}", stamp), "100mg", "Created by sync-demo");
    let med_id = session.medications()?.create(&mut med).await?;
    println!("✓ Created medication #{}", med_id);

    let mut reminder = Reminder::new(med_id, "09:00", "Mon,Wed,Fri");
    let reminder_id = session.reminders()?.create(&mut reminder).await?;
    println!("✓ Created reminder #{}", reminder_id);

    if let Some(agent) = session.agent() {
        let wait = agent.period() + Duration::from_secs(1);
        println!("Waiting {:?} for a background sync...", wait);
        tokio::time::sleep(wait).await;
        println!(
            "  background syncs: {} ok, {} failed",
            agent.stats().succeeded(),
            agent.stats().failed()
        );

        let report = session.sync().await?;
        println!("✓ Manual sync: {} frames, frame_no {:?}", report.frames_synced, report.frame_no);
    }

    println!();
    for med in session.medications()?.get_all().await? {
        println!("#{} {} ({})", med.id, med.name, med.dosage);
        for r in &med.reminders {
            let state = if r.is_active { "on" } else { "off" };
            println!("    {} {} [{}]", r.time, r.days, state);
        }
    }

    session.close().await?;
    info!("Demo finished");
    Ok(())
}

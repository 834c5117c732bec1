//! Generate a batch of items per template and write them as JSON.
//!
//! Usage: `seed_items [OUT_DIR] [COUNT]` (defaults: `generated_items`, 20).
//! TEMPLATES_DIR selects the template directory; SEED_BASE the first seed
//! (default 1000). Seeds are consecutive, so reruns write identical files.

use std::{fs, path::PathBuf};

use tracing::{error, info};

use teks_tutor::{telemetry, Item, ItemFactory};

fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let mut args = std::env::args().skip(1);
  let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "generated_items".into()));
  let count: u64 = match args.next() {
    Some(c) => c.parse()?,
    None => 20,
  };
  let base: u64 = std::env::var("SEED_BASE").ok().and_then(|s| s.parse().ok()).unwrap_or(1000);
  let templates_dir = std::env::var("TEMPLATES_DIR").unwrap_or_else(|_| "content/templates".into());

  let factory = ItemFactory::from_dir(&templates_dir)?;
  fs::create_dir_all(&out_dir)?;

  let ids: Vec<String> = factory.templates().ids().map(str::to_string).collect();
  let mut total = 0usize;
  for template_id in &ids {
    let mut items: Vec<Item> = Vec::with_capacity(count as usize);
    for seed in base..base + count {
      match factory.generate_item(template_id, seed) {
        Ok(item) => items.push(item),
        Err(e) => error!(target: "item", %template_id, seed, error = %e, "Skipping seed"),
      }
    }
    let path = out_dir.join(format!("{template_id}_items.json"));
    fs::write(&path, serde_json::to_string_pretty(&items)?)?;
    info!(target: "teks_tutor", %template_id, generated = items.len(), path = %path.display(), "Saved items");
    total += items.len();
  }

  info!(target: "teks_tutor", templates = ids.len(), total, out_dir = %out_dir.display(), "Seeding finished");
  Ok(())
}

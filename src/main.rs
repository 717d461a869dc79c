use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vktabgen::artifact::{self, RulesArtifact, TablesArtifact};
use vktabgen::cli::Cli;
use vktabgen::pipeline;
use vktabgen::registry::ExtensionKind;

/// Initialize tracing subscriber for debug output
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let need_model = cli.out_tables.is_some() || cli.out_rules.is_some() || cli.collision_stats;
    if !need_model && !cli.list_extensions {
        bail!("nothing to do: pass --out-tables, --out-rules, --collision-stats, or --list-extensions");
    }

    let registries =
        pipeline::load_files(&cli.xml_files, &cli.api).context("loading registry")?;

    if cli.list_extensions {
        for registry in &registries {
            for ext in registry.sorted_extensions(&cli.api) {
                let kind = match ext.kind {
                    Some(ExtensionKind::Instance) => "instance",
                    Some(ExtensionKind::Device) => "device",
                    None => "unsupported",
                };
                println!("{kind:<11} rev {:<3} {}", ext.version, ext.name);
            }
        }
    }

    if !need_model {
        return Ok(());
    }
    let model =
        pipeline::compile(&registries, &cli.api, cli.beta).context("compiling registry")?;

    if cli.collision_stats {
        for category in &model.categories {
            eprintln!(
                "{}: {} entries, {} slots, hash capacity {}",
                category.layout.category.as_str(),
                category.layout.entries.len(),
                category.layout.slot_count,
                category.string_map.capacity(),
            );
            for (depth, count) in category.string_map.collisions.iter().enumerate() {
                let tag = if depth == 9 { "+" } else { " " };
                eprintln!("  probe depth {depth}{tag} {count}");
            }
        }
    }

    if let Some(path) = &cli.out_tables {
        let bytes = artifact::to_canonical_json(&TablesArtifact::from_model(&model))?;
        artifact::write_if_changed(path, &bytes)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &cli.out_rules {
        let bytes = artifact::to_canonical_json(&RulesArtifact::from_model(&model))?;
        artifact::write_if_changed(path, &bytes)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}

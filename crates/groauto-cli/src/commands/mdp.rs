use crate::cli::MdpArgs;
use crate::config;
use crate::error::Result;
use crate::prompt::{ConsolePrompter, Prompt};
use groauto::core::mdp::templates;
use groauto::engine::error::EngineError;
use tracing::info;

pub fn run(args: MdpArgs) -> Result<()> {
    let cfg = {
        let mut console = ConsolePrompter::stdio();
        let prompt = if args.no_prompt {
            None
        } else {
            Some(&mut console as &mut dyn Prompt)
        };
        config::build_mdp_config(&args, prompt)?
    };
    if let Some(path) = &cfg.config_file {
        info!("Settings read from {:?}", path);
    }

    let written = templates::write_all(&cfg.output_dir, &cfg.parameters, &cfg.templates)
        .map_err(EngineError::from)?;

    for path in &written {
        println!("✓ Wrote {}", path.display());
    }
    println!(
        "Production: {} K, {} ns ({} steps) as {}",
        cfg.parameters.temperature(),
        cfg.parameters.length_ns(),
        cfg.parameters.total_steps(),
        cfg.parameters.production_name()
    );
    Ok(())
}

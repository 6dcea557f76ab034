// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

use clap::Parser;
use qanneal_sim::user_config::UserConfig;

#[derive(Debug, clap::Parser)]
#[command(long_about = None)]
struct Args {
    /// Topologies configuration. If not specified, the default values are used.
    #[arg(long, short)]
    conf: Option<String>,
    /// Create a template for the topologies configuration in the given file.
    #[arg(long, short)]
    template: Option<String>,
    /// Name of the path where to save the images.
    #[arg(long, default_value_t = String::from(""))]
    output_path: String,
    /// Also save the graphs to Graphviz DOT files.
    #[arg(long, default_value_t = false)]
    save_dot: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    // If requested, save a template configuration file and quit.
    if let Some(template) = &args.template {
        let template_path = std::path::Path::new(template);
        if template_path.exists() {
            log::warn!("File {:#?} exists and will not be overwritten", template_path);
        } else {
            std::fs::write(
                template_path,
                serde_json::to_string_pretty(&UserConfig::default())?,
            )?;
        }
        return Ok(());
    }

    // Read the user's configuration file, only if explicitly given.
    let user_config: UserConfig = match &args.conf {
        Some(conf) => {
            let conf_file = std::fs::File::open(conf)?;
            let reader = std::io::BufReader::new(conf_file);
            serde_json::from_reader(reader)?
        }
        None => UserConfig::default(),
    };
    log::info!("{}: {}", UserConfig::header(), user_config.to_csv());

    qanneal_sim::render::render_topologies(&user_config, &args.output_path, args.save_dot)?;

    Ok(())
}

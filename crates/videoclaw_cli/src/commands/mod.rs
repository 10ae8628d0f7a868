//! Subcommand implementations.

mod config;
mod generate;
mod init;
mod select;
mod status;
mod step;
mod validate;

use anyhow::Result;

use crate::app::App;
use crate::cli::Commands;

pub fn dispatch(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Init { name, dir } => init::init(app, &name, dir.as_deref()),
        Commands::Status { project, json } => status::status(app, &project, json),
        Commands::Analyze { step, script } => step::analyze(app, &step, &script),
        Commands::Assets { step } => step::assets(app, &step),
        Commands::Storyboard { step } => step::storyboard(app, &step),
        Commands::I2v {
            step,
            images,
            prompt,
        } => step::i2v(app, &step, images, prompt),
        Commands::Audio { step } => step::audio(app, &step),
        Commands::Merge { step } => step::merge(app, &step),
        Commands::Run { step, script, json } => step::run(app, &step, &script, json),
        Commands::Config {
            project,
            list,
            get,
            set,
        } => config::config(app, project.as_deref(), list, get.as_deref(), set.as_deref()),
        Commands::Validate { project, strict } => validate::validate(app, &project, strict),
        Commands::Select {
            project,
            step,
            artifact,
        } => select::select(app, &project, &step, &artifact),
        Commands::Alternatives { project } => select::alternatives(app, &project),
        Commands::T2i {
            prompt,
            output,
            provider,
            model,
        } => generate::t2i(app, &prompt, &output, provider, model),
        Commands::I2i {
            input,
            prompt,
            output,
            provider,
            model,
        } => generate::i2i(app, &input, &prompt, &output, provider, model),
        Commands::Upload {
            input,
            remote,
            provider,
        } => generate::upload(app, &input, &remote, provider),
    }
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "videoclaw")]
#[command(author, version, about = "AI short video creation pipeline")]
pub struct Cli {
    /// Directory holding all projects (default: $VIDEOCLAW_PROJECTS_DIR or ~/videoclaw-projects)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Path to the global config file (default: ~/.videoclaw/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every pipeline step.
#[derive(Args, Clone, Debug)]
pub struct StepArgs {
    /// Project name
    #[arg(short, long)]
    pub project: String,

    /// Candidates to generate per item
    #[arg(short = 'n', long, alias = "num-variants")]
    pub variants: Option<u32>,

    /// Review each candidate before keeping it
    #[arg(short, long)]
    pub interactive: bool,

    /// Skip the step if its artifacts already exist
    #[arg(long)]
    pub reuse_existing: bool,

    /// Generation provider for this step's media kind
    #[arg(long)]
    pub provider: Option<String>,
}

/// Where the script text comes from.
#[derive(Args, Clone, Debug)]
#[group(required = true, multiple = false)]
pub struct ScriptArgs {
    /// Script text
    #[arg(short, long)]
    pub script: Option<String>,

    /// Read the script from a file
    #[arg(long)]
    pub script_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project
    Init {
        /// Project name (letters, digits, '-' and '_')
        name: String,

        /// Create the project under this directory instead of the projects root
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Show project and step status
    Status {
        /// Project name
        #[arg(short, long)]
        project: String,

        /// Print the raw state document
        #[arg(long)]
        json: bool,
    },

    /// Parse a script into characters, scenes and storyboard frames
    Analyze {
        #[command(flatten)]
        step: StepArgs,

        #[command(flatten)]
        script: ScriptArgs,
    },

    /// Generate character and scene images
    Assets {
        #[command(flatten)]
        step: StepArgs,
    },

    /// Render one image per storyboard frame
    Storyboard {
        #[command(flatten)]
        step: StepArgs,
    },

    /// Turn storyboard frames (or given images) into video clips
    I2v {
        #[command(flatten)]
        step: StepArgs,

        /// Animate these images instead of the storyboard
        #[arg(long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,

        /// Prompt for standalone images
        #[arg(short = 't', long, requires = "images")]
        prompt: Option<String>,
    },

    /// Generate narration and background music
    Audio {
        #[command(flatten)]
        step: StepArgs,
    },

    /// Merge clips and audio into the final video
    Merge {
        #[command(flatten)]
        step: StepArgs,
    },

    /// Run the whole pipeline
    Run {
        #[command(flatten)]
        step: StepArgs,

        #[command(flatten)]
        script: ScriptArgs,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read or edit configuration
    Config {
        /// Edit this project's config instead of the global one
        #[arg(short, long)]
        project: Option<String>,

        /// List every key in the file
        #[arg(long)]
        list: bool,

        /// Print one dotted key
        #[arg(long, value_name = "KEY", conflicts_with = "list")]
        get: Option<String>,

        /// Set one dotted key
        #[arg(long, value_name = "KEY=VALUE", conflicts_with_all = ["list", "get"])]
        set: Option<String>,
    },

    /// Check the project state document
    Validate {
        /// Project name
        #[arg(short, long)]
        project: String,

        /// Also require characters, scenes and frames
        #[arg(long)]
        strict: bool,
    },

    /// Make a generated variant the chosen one
    Select {
        /// Project name
        #[arg(short, long)]
        project: String,

        /// Step that produced the variant (assets or storyboard)
        #[arg(long)]
        step: String,

        /// Path of the variant to choose
        #[arg(long)]
        artifact: String,
    },

    /// List every alternative recorded across steps
    Alternatives {
        /// Project name
        #[arg(short, long)]
        project: String,
    },

    /// Generate one image from a prompt, outside any project
    T2i {
        /// Generation prompt
        #[arg(short, long)]
        prompt: String,

        /// Where to write the image
        #[arg(short, long)]
        output: PathBuf,

        /// Image provider (default: models.image.provider)
        #[arg(long)]
        provider: Option<String>,

        /// Model name (default: models.image.model)
        #[arg(long)]
        model: Option<String>,
    },

    /// Generate one image from a reference image and a prompt
    I2i {
        /// Reference image
        #[arg(short, long)]
        input: PathBuf,

        /// Generation prompt
        #[arg(short, long)]
        prompt: String,

        /// Where to write the image
        #[arg(short, long)]
        output: PathBuf,

        /// Image provider (default: models.image.provider)
        #[arg(long)]
        provider: Option<String>,

        /// Model name (default: models.image.model)
        #[arg(long)]
        model: Option<String>,
    },

    /// Copy one file to the configured storage
    Upload {
        /// Local file
        #[arg(short, long)]
        input: PathBuf,

        /// Target path in storage, e.g. my-project/final.mp4
        #[arg(short, long)]
        remote: String,

        /// Storage provider (default: storage.provider)
        #[arg(long)]
        provider: Option<String>,
    },
}

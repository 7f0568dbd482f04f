use {super::*, options::Options};

pub mod assemble;
pub mod build;
mod settings_cmd;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
    #[command(about = "Join coinb1, extranonces and coinb2 into a transaction")]
    Assemble(assemble::Assemble),
    #[command(about = "Build a generation transaction from a block template")]
    Build(build::Build),
    #[command(about = "Print resolved settings")]
    Settings(settings_cmd::SettingsCmd),
}

impl Subcommand {
    pub(crate) fn run(self, options: Options) -> anyhow::Result<()> {
        match self {
            Self::Assemble(assemble) => assemble.run(),
            Self::Build(build) => build.run(Settings::load(options)?),
            Self::Settings(settings) => settings.run(Settings::load(options)?),
        }
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use docxide_md::{Converter, DocumentConfig, DocumentStyle, PaperSize};

#[derive(Parser)]
#[command(
    name = "docxide-md",
    version,
    about = "Convert Markdown to a consistently formatted Word document"
)]
struct Cli {
    /// Input Markdown file, relative to the working directory
    input: PathBuf,

    /// Output DOCX file, relative to the working directory
    output: PathBuf,

    /// Working directory (contains the input and the img/ folder)
    #[arg(short = 'w', long)]
    working_dir: Option<PathBuf>,

    /// Document author
    #[arg(short, long, default_value = "")]
    author: String,

    /// Document date
    #[arg(short, long, default_value = "")]
    date: String,

    /// Document language tag
    #[arg(short, long, default_value = "en-US")]
    language: String,

    #[arg(long, value_enum)]
    paper_size: Option<PaperSize>,

    /// Style preset
    #[arg(long, value_enum, default_value = "report")]
    style: DocumentStyle,

    #[arg(long)]
    font: Option<String>,

    /// Base font size in points
    #[arg(long)]
    font_size: Option<f32>,

    /// Footer text on odd pages
    #[arg(long)]
    footer_odd: Option<String>,

    /// Footer text on even pages
    #[arg(long)]
    footer_even: Option<String>,

    /// Disable table of contents
    #[arg(long)]
    no_toc: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn document_config(&self) -> DocumentConfig {
        let mut config = DocumentConfig::preset(self.style);
        config.author = self.author.clone();
        config.date = self.date.clone();
        config.language = self.language.clone();
        config.generate_toc = !self.no_toc;
        if let Some(paper_size) = self.paper_size {
            config.paper_size = paper_size;
        }
        if let Some(font) = &self.font {
            config.font_name = font.clone();
        }
        if let Some(size) = self.font_size {
            config.base_font_size = size;
        }
        if let Some(odd) = &self.footer_odd {
            config.footer_text.odd = odd.clone();
        }
        if let Some(even) = &self.footer_even {
            config.footer_text.even = even.clone();
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let converter = Converter::new(cli.document_config());
    let result = converter.check_dependencies().and_then(|()| {
        converter.convert(&cli.input, &cli.output, cli.working_dir.as_deref())
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

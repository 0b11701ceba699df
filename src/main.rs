use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use mdtree_pdf::{Cover, FontPaths, Options, PageSize, RenderOptions};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Paper {
    A4,
    Letter,
}

#[derive(Parser)]
#[command(name = "mdtree-pdf", version)]
#[command(about = "Render a CommonMark XML document tree to PDF")]
struct Cli {
    /// Document tree as CommonMark XML (`cmark-gfm -t xml`)
    input: PathBuf,

    /// Output PDF path (defaults to the input path with a .pdf extension)
    output: Option<PathBuf>,

    /// TrueType file for regular text (built-in Helvetica when omitted)
    #[arg(long)]
    regular_font: Option<PathBuf>,

    /// TrueType file for bold text
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// TrueType file for italic text
    #[arg(long)]
    italic_font: Option<PathBuf>,

    /// Layout scale factor
    #[arg(long, default_value_t = 0.75)]
    zoom: f32,

    #[arg(long, value_enum, default_value_t = Paper::A4)]
    page_size: Paper,

    /// Render a cover page with this title, and a running footer
    #[arg(long)]
    cover_title: Option<String>,
    #[arg(long, default_value = "")]
    cover_author: String,
    #[arg(long, default_value = "")]
    cover_author_link: String,
    #[arg(long, default_value = "")]
    cover_link: String,
    #[arg(long, default_value = "")]
    cover_source: String,
    #[arg(long, default_value = "")]
    cover_source_link: String,
    #[arg(long, default_value = "")]
    cover_license: String,
    #[arg(long, default_value = "")]
    cover_license_link: String,
    /// Logo image URL or path, centered above the title
    #[arg(long, default_value = "")]
    cover_logo_link: String,
    #[arg(long, default_value = "")]
    cover_logo_title: String,
    #[arg(long, default_value = "")]
    cover_logo_title_link: String,
    #[arg(long)]
    cover_author_label: Option<String>,
    #[arg(long)]
    cover_link_label: Option<String>,
    #[arg(long)]
    cover_source_label: Option<String>,
    #[arg(long)]
    cover_license_label: Option<String>,
}

impl Cli {
    fn options(&self) -> Options {
        let mut render = RenderOptions::with_zoom(self.zoom);
        render.page = match self.page_size {
            Paper::A4 => PageSize::A4,
            Paper::Letter => PageSize::LETTER,
        };
        let fonts = FontPaths {
            regular: self.regular_font.clone(),
            bold: self.bold_font.clone(),
            italic: self.italic_font.clone(),
        };
        let cover = self.cover_title.as_ref().map(|title| {
            let defaults = Cover::default();
            Cover {
                title: title.clone(),
                author_label: self.cover_author_label.clone().unwrap_or(defaults.author_label),
                author: self.cover_author.clone(),
                author_link: self.cover_author_link.clone(),
                link_label: self.cover_link_label.clone().unwrap_or(defaults.link_label),
                link: self.cover_link.clone(),
                source_label: self.cover_source_label.clone().unwrap_or(defaults.source_label),
                source: self.cover_source.clone(),
                source_link: self.cover_source_link.clone(),
                license_label: self.cover_license_label.clone().unwrap_or(defaults.license_label),
                license: self.cover_license.clone(),
                license_link: self.cover_license_link.clone(),
                logo_link: self.cover_logo_link.clone(),
                logo_title: self.cover_logo_title.clone(),
                logo_title_link: self.cover_logo_title_link.clone(),
            }
        });
        Options {
            render,
            fonts,
            cover,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("pdf"));

    match mdtree_pdf::convert_xml_to_pdf(&cli.input, &output, &cli.options()) {
        Ok(()) => {
            log::info!("Converted {} -> {}", cli.input.display(), output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}: {e}", cli.input.display());
            ExitCode::FAILURE
        }
    }
}

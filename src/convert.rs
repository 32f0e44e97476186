//! Markdown → DOCX conversion: pre-scan, pandoc, then the formatting engine.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use crate::config::DocumentConfig;
use crate::error::Error;
use crate::markdown;
use crate::model::ImageReference;

pub const IMAGE_DIR: &str = "img";

/// Pandoc filter: Markdown `##` becomes Word Heading 1, `###` Heading 2, and so on.
const HEADING_FILTER: &str = r#"function Header(el)
    if el.level > 1 then
        el.level = el.level - 1
    end
    return el
end
"#;

fn install_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "brew install pandoc"
    } else if cfg!(target_os = "linux") {
        "sudo apt-get install pandoc  # or use your package manager"
    } else if cfg!(target_os = "windows") {
        "Download from https://pandoc.org/installing.html"
    } else {
        "See https://pandoc.org/installing.html"
    }
}

pub struct Converter {
    config: DocumentConfig,
}

impl Converter {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn check_dependencies(&self) -> Result<(), Error> {
        match Command::new("pandoc").arg("--version").output() {
            Ok(out) if out.status.success() => {
                let version = String::from_utf8_lossy(&out.stdout);
                log::debug!("Found {}", version.lines().next().unwrap_or("pandoc"));
                Ok(())
            }
            _ => Err(Error::PandocMissing(install_hint())),
        }
    }

    /// Converts `input` to `output`, both relative to `working_dir` (the current
    /// directory when `None`). Images are read from `working_dir/img`.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        working_dir: Option<&Path>,
    ) -> Result<(), Error> {
        let t0 = Instant::now();
        let work_dir = match working_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()?,
        };
        if !work_dir.is_dir() {
            return Err(Error::InputNotFound(work_dir));
        }
        let input_path = work_dir.join(input);
        let output_path = work_dir.join(output);

        if !input_path.exists() {
            return Err(Error::InputNotFound(input_path));
        }
        let is_markdown = input_path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"));
        if !is_markdown {
            log::warn!(
                "Input file {} may not be a markdown file",
                input_path.display()
            );
        }

        let img_dir = work_dir.join(IMAGE_DIR);
        if !img_dir.exists() {
            std::fs::create_dir_all(&img_dir)?;
            log::info!("Created image directory: {}", img_dir.display());
        }

        let content = std::fs::read_to_string(&input_path)?;
        let title = markdown::extract_title(&content);
        let image_refs = markdown::extract_image_references(&content);
        log::info!("Found {} image references", image_refs.len());
        let t_scan = t0.elapsed();

        let temp_md = self.write_temp_markdown(&content, &work_dir)?;
        self.run_pandoc(temp_md.path(), &output_path, &title)?;
        drop(temp_md);
        let t_pandoc = t0.elapsed();

        self.post_process(&output_path, &title, &image_refs, &work_dir)?;
        let t_total = t0.elapsed();

        log::info!(
            "Timing: scan={:.1}ms, pandoc={:.1}ms, format={:.1}ms, total={:.1}ms",
            t_scan.as_secs_f64() * 1000.0,
            (t_pandoc - t_scan).as_secs_f64() * 1000.0,
            (t_total - t_pandoc).as_secs_f64() * 1000.0,
            t_total.as_secs_f64() * 1000.0,
        );
        log::info!("Conversion successful! File saved: {}", output_path.display());
        Ok(())
    }

    /// Placeholder-substituted copy of the source, next to it so relative links
    /// still resolve. Removed when the handle drops.
    fn write_temp_markdown(
        &self,
        content: &str,
        work_dir: &Path,
    ) -> Result<tempfile::NamedTempFile, Error> {
        let mut file = tempfile::Builder::new()
            .prefix("temp_")
            .suffix(".md")
            .tempfile_in(work_dir)?;
        file.write_all(markdown::replace_image_references(content).as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    pub fn pandoc_args(
        &self,
        input: &Path,
        output: &Path,
        title: &str,
        filter: &Path,
    ) -> Vec<String> {
        let mut args = vec![
            input.display().to_string(),
            "-o".into(),
            output.display().to_string(),
            "-f".into(),
            "markdown".into(),
            "-t".into(),
            "docx".into(),
            "--wrap=none".into(),
            "--columns=999".into(),
            format!("--lua-filter={}", filter.display()),
            "-M".into(),
            format!("title={title}"),
            "-M".into(),
            format!("author={}", self.config.author),
            "-M".into(),
            format!("date={}", self.config.date),
        ];
        if self.config.generate_toc {
            args.push("--toc".into());
            args.push("--number-sections".into());
        }
        args
    }

    fn run_pandoc(&self, input: &Path, output: &Path, title: &str) -> Result<(), Error> {
        let mut filter = tempfile::Builder::new()
            .prefix("adjust_headers")
            .suffix(".lua")
            .tempfile()?;
        filter.write_all(HEADING_FILTER.as_bytes())?;
        filter.flush()?;

        let args = self.pandoc_args(input, output, title, filter.path());
        log::debug!("pandoc {}", args.join(" "));
        let out = Command::new("pandoc").args(&args).output()?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            log::error!("Pandoc conversion failed: {stderr}");
            return Err(Error::Pandoc(stderr));
        }
        log::info!("Pandoc conversion completed successfully");
        Ok(())
    }

    /// Opens the converted document, normalizes it, fills image placeholders and
    /// saves it back in place.
    pub fn post_process(
        &self,
        docx_path: &Path,
        title: &str,
        image_refs: &[ImageReference],
        working_dir: &Path,
    ) -> Result<(), Error> {
        let (report, images) = crate::format_docx(
            docx_path,
            &self.config,
            title,
            image_refs,
            &image_root(working_dir),
        )?;
        if !report.missing_styles.is_empty() {
            log::warn!("Styles not found: {}", report.missing_styles.join(", "));
        }
        log::info!(
            "Images: {} embedded, {} failed, {} not found",
            images.embedded,
            images.failed,
            images.not_found
        );
        Ok(())
    }
}

pub fn image_root(working_dir: &Path) -> PathBuf {
    working_dir.join(IMAGE_DIR)
}

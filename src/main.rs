use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use inkshot::capture::{FrameSource, StillFrameSource};
use inkshot::config::{EditorConfig, StrokeColor};
use inkshot::domain::{Rect, Stroke};
use inkshot::export::{self, ExportFormat, FileEncoder};
use inkshot::render::Compositor;
use inkshot::session::EditorSession;

/// Annotate a screenshot and write the flattened result
#[derive(Parser, Debug)]
#[command(name = "inkshot")]
#[command(about = "Draw strokes over a screenshot and export it")]
#[command(version)]
struct Args {
    /// Screenshot to annotate
    input: PathBuf,

    /// JSON file with an array of strokes to apply, oldest first
    #[arg(short, long)]
    strokes: Option<PathBuf>,

    /// Only use this part of the screenshot, as x,y,width,height
    #[arg(long, value_parser = parse_region)]
    region: Option<Rect>,

    /// Canvas fill behind the screenshot, as #rrggbb or #rrggbbaa
    #[arg(short, long)]
    background: Option<StrokeColor>,

    /// Write the padded, size-limited export layout instead of a plain save
    #[arg(short, long)]
    export: bool,

    /// Destination file; defaults to a timestamped file in the save location
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_region(s: &str) -> std::result::Result<Rect, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid region {s:?}: {e}"))?;
    match parts[..] {
        [x, y, w, h] if w > 0 && h > 0 => Ok(Rect::from_xywh(x, y, w as u32, h as u32)),
        [_, _, _, _] => Err(format!("region {s:?} has no area")),
        _ => Err(format!("expected x,y,width,height, got {s:?}")),
    }
}

/// Parse a stroke list, skipping entries that do not form a valid stroke
fn load_strokes(path: &std::path::Path) -> Result<Vec<Stroke>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read strokes file: {}", path.display()))?;
    let entries: Vec<serde_json::Value> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse strokes file: {}", path.display()))?;

    let mut strokes = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Stroke>(entry) {
            Ok(stroke) => strokes.push(stroke),
            Err(err) => log::warn!("Skipping stroke {}: {}", i, err),
        }
    }
    Ok(strokes)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = EditorConfig::load();

    let source = StillFrameSource::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let base = match args.region {
        Some(rect) => source.capture_region(rect),
        None => source.capture_full_screen(),
    }
    .context("Capture failed")?;

    let mut session = EditorSession::new(config.clone());
    if let Some(bg) = args.background {
        session.background = Some(bg);
    }
    if let Some(path) = &args.strokes {
        for stroke in load_strokes(path)? {
            session.timeline.commit(stroke);
        }
        log::info!("Applied {} strokes", session.timeline.len());
    }

    let compositor = Compositor::from_config(&config);
    let img = if args.export {
        session.export_image(&compositor, &base)?
    } else {
        session.flatten(&compositor, &base)?
    };

    let (format, path) = match args.output {
        Some(path) => (ExportFormat::from_path(&path), path),
        None => {
            let path = export::get_export_path(config.save_location, "Edited", config.export_format)
                .context("No save directory available")?;
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
            (config.export_format, path)
        }
    };

    let encoder = Arc::new(FileEncoder {
        jpeg_quality: config.jpeg_quality,
    });
    let written = export::export_in_background(encoder, img, format, path).await?;
    println!("{}", written.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region() {
        assert_eq!(parse_region("10, 20,30,40"), Ok(Rect::from_xywh(10, 20, 30, 40)));
        assert!(parse_region("10,20,0,40").is_err());
        assert!(parse_region("10,20,30").is_err());
        assert!(parse_region("a,b,c,d").is_err());
    }

    #[test]
    fn test_load_strokes_skips_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strokes.json");
        std::fs::write(
            &path,
            r#"[
                {"tool": "pen", "points": [{"x": 1.0, "y": 1.0}], "color": {"r": 1.0, "g": 0.0, "b": 0.0}, "line_width": 3.0},
                {"tool": "arrow", "points": [{"x": 1.0, "y": 1.0}], "color": {"r": 1.0, "g": 0.0, "b": 0.0}, "line_width": 3.0},
                {"tool": "laser"}
            ]"#,
        )
        .unwrap();
        let strokes = load_strokes(&path).unwrap();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].tool(), inkshot::domain::Tool::Pen);
    }
}

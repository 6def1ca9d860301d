use anyhow::{Result, bail};
use easel_core::Document;
use easel_editor::{Editor, EditorConfig, ExportFormat, MemoryScene};

/// Container the headless editor is mounted in. Exports render at one
/// pixel per unit regardless, so this only affects the fitted viewport.
const CONTAINER: (f64, f64) = (1920.0, 1080.0);

fn mount(config: EditorConfig, json: Option<&str>) -> Result<Editor<MemoryScene>> {
    let scene = MemoryScene::new(CONTAINER.0, CONTAINER.1);
    Ok(Editor::new(scene, config, json)?)
}

/// A blank document; `width`/`height` override the configured workspace.
pub fn new_document(
    mut config: EditorConfig,
    width: Option<f64>,
    height: Option<f64>,
) -> Result<String> {
    if let Some(width) = width {
        config.workspace_width = width;
    }
    if let Some(height) = height {
        config.workspace_height = height;
    }
    if config.workspace_width <= 0.0 || config.workspace_height <= 0.0 {
        bail!(
            "workspace size must be positive, got {}x{}",
            config.workspace_width,
            config.workspace_height
        );
    }
    save(&mount(config, None)?)
}

/// Load and save through the editor: drops non-allow-listed keys and
/// recomputes text layout.
pub fn normalize(config: EditorConfig, json: &str) -> Result<String> {
    save(&mount(config, Some(json))?)
}

pub fn export(config: EditorConfig, json: &str, format: ExportFormat) -> Result<Vec<u8>> {
    let mut editor = mount(config, Some(json))?;
    let download = match format {
        ExportFormat::Png => editor.save_png()?,
        ExportFormat::Jpeg => editor.save_jpg()?,
        ExportFormat::Svg => editor.save_svg()?,
    };
    Ok(download.bytes)
}

pub fn info(json: &str) -> Result<String> {
    let document = Document::from_json(json)?;
    Ok(format!(
        "version:    {}\nworkspace:  {}x{}\nbackground: {}\nobjects:    {}",
        document.version,
        document.width,
        document.height,
        document.background.as_deref().unwrap_or("none"),
        document.objects.iter().filter(|obj| !obj.is_workspace()).count(),
    ))
}

fn save(editor: &Editor<MemoryScene>) -> Result<String> {
    let download = editor.save_json()?;
    Ok(String::from_utf8(download.bytes)?)
}

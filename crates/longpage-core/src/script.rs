//! Photoshop ExtendScript (`.jsx`) emitter.
//!
//! The emitted program rebuilds one partition as a document of placed smart objects:
//! it switches the editor to pixel units, creates a `width x total_height` document,
//! places every file of the partition's image folder at `(0, y)` and saves a `.psd`
//! next to itself. Every global preference it touches is restored in a `finally` block.

use crate::error::{LongPageError, Result};
use crate::layout::LayoutPlan;
use serde::Serialize;

/// Largest translation the placement routine applies in one call by default.
pub const DEFAULT_MAX_TRANSLATE_STEP: u32 = 5000;

const WHITE: [u8; 3] = [255, 255, 255];

/// One placed file: path relative to the image folder and its absolute top offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptEntry {
    pub file: String,
    pub y: u32,
}

/// Emitted script bound to one partition.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptDocument {
    pub document_name: String,
    pub width: u32,
    pub height: u32,
    /// Image folder, relative to the script's own location.
    pub folder: String,
    pub entries: Vec<ScriptEntry>,
    /// Program text.
    pub source: String,
}

/// Inputs for one script.
#[derive(Debug, Clone)]
pub struct ScriptRequest<'a> {
    /// Document title and `.psd` base name.
    pub document_name: &'a str,
    pub folder: &'a str,
    /// One file name per placement, in plan order.
    pub files: &'a [String],
    pub plan: &'a LayoutPlan,
    pub max_translate_step: u32,
    /// Document fill colour.
    pub background: [u8; 3],
}

/// Splits a translation into steps of at most `max_step` pixels summing exactly to `delta`.
///
/// Same decomposition `safeTranslate` performs inside the emitted script; callers use it to
/// predict the `translate` calls a placement costs. The emitter itself never calls it.
pub fn translate_steps(delta: i64, max_step: u32) -> Vec<i64> {
    let max = i64::from(max_step.max(1));
    let mut rest = delta;
    let mut steps = Vec::new();
    while rest.abs() > max {
        let step = rest.clamp(-max, max);
        steps.push(step);
        rest -= step;
    }
    if rest != 0 {
        steps.push(rest);
    }
    steps
}

/// Quotes `s` as a JavaScript string literal; non-ASCII becomes `\uXXXX` so the file stays ASCII.
pub fn js_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out.push('"');
    out
}

/// Emits the build script for one partition.
pub fn emit_script(req: &ScriptRequest<'_>) -> Result<ScriptDocument> {
    if req.plan.is_empty() {
        return Err(LongPageError::Empty);
    }
    if req.files.len() != req.plan.len() {
        return Err(LongPageError::InvalidInput(format!(
            "{} file names for {} placements",
            req.files.len(),
            req.plan.len()
        )));
    }
    let entries: Vec<ScriptEntry> = req
        .files
        .iter()
        .zip(&req.plan.placements)
        .map(|(file, p)| ScriptEntry {
            file: file.clone(),
            y: p.y,
        })
        .collect();
    let custom_fill = req.background != WHITE;

    let mut s = String::new();
    s.push_str("#target photoshop\n");
    s.push_str(&format!(
        "// {} images, {}x{} px\n\n",
        entries.len(),
        req.plan.width,
        req.plan.total_height
    ));

    // saved global state
    s.push_str("var _oldDialogs = app.displayDialogs;\n");
    s.push_str("var _oldRulerUnits = app.preferences.rulerUnits;\n");
    s.push_str("var _oldTypeUnits = app.preferences.typeUnits;\n");
    if custom_fill {
        s.push_str("var _oldBackground = app.backgroundColor;\n");
    }
    s.push_str("function _restoreSettings(){\n");
    s.push_str("  app.preferences.rulerUnits = _oldRulerUnits;\n");
    s.push_str("  app.preferences.typeUnits = _oldTypeUnits;\n");
    if custom_fill {
        s.push_str("  app.backgroundColor = _oldBackground;\n");
    }
    s.push_str("  app.displayDialogs = _oldDialogs;\n");
    s.push_str("}\n\n");

    let max_step = req.max_translate_step.max(1).to_string();
    s.push_str(&PLACEMENT_HELPERS.replace("{MAX_STEP}", &max_step));

    s.push_str("try {\n");
    s.push_str("  app.displayDialogs = DialogModes.NO;\n");
    s.push_str("  app.preferences.rulerUnits = Units.PIXELS;\n");
    s.push_str("  app.preferences.typeUnits = TypeUnits.PIXELS;\n");
    s.push_str("  var baseFolder = new File($.fileName).parent;\n");
    s.push_str(&format!(
        "  var imgFolder = new Folder(baseFolder.fsName + \"/\" + {});\n",
        js_quote(req.folder)
    ));
    s.push_str(
        "  if(!imgFolder.exists){ throw new Error(\"Missing image folder: \" + imgFolder.fsName); }\n",
    );
    s.push_str("  var names = [\n");
    for (i, e) in entries.iter().enumerate() {
        let comma = if i + 1 != entries.len() { "," } else { "" };
        s.push_str(&format!("    {}{}\n", js_quote(&e.file), comma));
    }
    s.push_str("  ];\n");
    s.push_str("  var ys = [\n");
    for (i, e) in entries.iter().enumerate() {
        let comma = if i + 1 != entries.len() { "," } else { "" };
        s.push_str(&format!("    {}{}\n", e.y, comma));
    }
    s.push_str("  ];\n");
    // every file is checked before the document exists
    s.push_str("  var files = [];\n");
    s.push_str("  for(var i=0;i<names.length;i++){\n");
    s.push_str("    files.push(requireFile(new File(imgFolder.fsName + \"/\" + names[i])));\n");
    s.push_str("  }\n");
    if custom_fill {
        let [r, g, b] = req.background;
        s.push_str("  var fill = new SolidColor();\n");
        s.push_str(&format!(
            "  fill.rgb.red = {}; fill.rgb.green = {}; fill.rgb.blue = {};\n",
            r, g, b
        ));
        s.push_str("  app.backgroundColor = fill;\n");
    }
    s.push_str(&format!(
        "  var doc = app.documents.add({}, {}, 72, {}, NewDocumentMode.RGB, {});\n",
        req.plan.width,
        req.plan.total_height,
        js_quote(req.document_name),
        if custom_fill {
            "DocumentFill.BACKGROUNDCOLOR"
        } else {
            "DocumentFill.WHITE"
        }
    ));
    s.push_str("  for(var j=0;j<files.length;j++){\n");
    s.push_str("    placeSmartObject(requireFile(files[j]));\n");
    s.push_str("    var layer = doc.activeLayer;\n");
    s.push_str("    moveLayerToXY(layer, 0, ys[j]);\n");
    s.push_str("    layer.name = \"IMG_\" + (j+1);\n");
    s.push_str("  }\n");
    s.push_str(&format!(
        "  var outPsd = new File(baseFolder.fsName + \"/\" + {});\n",
        js_quote(&format!("{}.psd", req.document_name))
    ));
    s.push_str("  var psdOpt = new PhotoshopSaveOptions();\n");
    s.push_str("  psdOpt.embedColorProfile = true;\n");
    s.push_str("  psdOpt.maximizeCompatibility = true;\n");
    s.push_str("  doc.saveAs(outPsd, psdOpt, true, Extension.LOWERCASE);\n");
    s.push_str("  alert(\"PSD saved: \" + outPsd.fsName);\n");
    s.push_str("} catch(e) {\n");
    s.push_str("  alert(\"PSD build failed: \" + (e && e.message ? e.message : e));\n");
    s.push_str("} finally {\n");
    s.push_str("  _restoreSettings();\n");
    s.push_str("}\n");

    Ok(ScriptDocument {
        document_name: req.document_name.to_string(),
        width: req.plan.width,
        height: req.plan.total_height,
        folder: req.folder.to_string(),
        entries,
        source: s,
    })
}

const PLACEMENT_HELPERS: &str = r##"function requireFile(file){
  if(!file.exists){ throw new Error("Missing image file: " + file.fsName); }
  return file;
}

function placeSmartObject(file){
  var desc = new ActionDescriptor();
  desc.putPath(charIDToTypeID("null"), file);
  desc.putEnumerated(charIDToTypeID("FTcs"), charIDToTypeID("QCSt"), charIDToTypeID("Qcs0"));
  var ofs = new ActionDescriptor();
  ofs.putUnitDouble(charIDToTypeID("Hrzn"), charIDToTypeID("#Pxl"), 0);
  ofs.putUnitDouble(charIDToTypeID("Vrtc"), charIDToTypeID("#Pxl"), 0);
  desc.putObject(charIDToTypeID("Ofst"), charIDToTypeID("Ofst"), ofs);
  executeAction(charIDToTypeID("Plc "), desc, DialogModes.NO);
}

function safeTranslate(layer, dx, dy){
  var maxStep = {MAX_STEP};
  var sx = dx, sy = dy;
  while(Math.abs(sx) > maxStep || Math.abs(sy) > maxStep){
    var stepX = Math.max(-maxStep, Math.min(maxStep, sx));
    var stepY = Math.max(-maxStep, Math.min(maxStep, sy));
    layer.translate(stepX, stepY);
    sx -= stepX; sy -= stepY;
  }
  if(sx !== 0 || sy !== 0){ layer.translate(sx, sy); }
}

function moveLayerToXY(layer, x, y){
  var b = layer.bounds;
  var left = Math.round(b[0].as("px"));
  var top = Math.round(b[1].as("px"));
  safeTranslate(layer, Math.round(x - left), Math.round(y - top));
}

"##;

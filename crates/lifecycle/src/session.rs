use brush_mask::{CanvasRect, MaskSurface, PointerEvent, StrokeScript, codec};
use chrono::Utc;
use neongen_common::{ImageAsset, Size};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    controller::{OperationController, OperationHandle},
    download::{EDIT_DOWNLOAD_NAME, generated_download_name},
    error::{Result, SubmitError},
    request::OperationRequest,
    state::OperationState,
};

/// What happens to the brushed region when an edit is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaskPolicy {
    /// The highlight is visual feedback only; the edit carries image and prompt
    #[default]
    Cosmetic,
    /// The strokes are rendered to a binary mask and sent along with the edit
    Attach,
}

/// Upload, brush and edit workflow around one source image
pub struct EditorSession {
    surface: MaskSurface,
    source: Option<ImageAsset>,
    source_size: Size,
    prompt: String,
    controller: OperationController,
    mask_policy: MaskPolicy,
}

impl EditorSession {
    pub fn new(controller: OperationController) -> Self {
        Self {
            surface: MaskSurface::new(),
            source: None,
            source_size: Size::default(),
            prompt: String::new(),
            controller,
            mask_policy: MaskPolicy::default(),
        }
    }

    pub fn with_mask_policy(mut self, policy: MaskPolicy) -> Self {
        self.mask_policy = policy;
        self
    }

    /// Use a newly uploaded image as the source, clearing any prior result
    pub fn load_image(&mut self, asset: ImageAsset) -> Result<Size> {
        let bitmap = codec::decode_asset(&asset)?;
        self.source_size = Size::new(bitmap.width(), bitmap.height());
        let size = self.surface.load(&bitmap);
        self.controller.reset();
        self.source = Some(asset);
        self.sync_lock();
        Ok(size)
    }

    pub fn source(&self) -> Option<&ImageAsset> {
        self.source.as_ref()
    }

    pub fn surface(&self) -> &MaskSurface {
        &self.surface
    }

    pub fn controller(&self) -> &OperationController {
        &self.controller
    }

    pub fn state(&self) -> OperationState {
        self.controller.state()
    }

    pub fn mask_policy(&self) -> MaskPolicy {
        self.mask_policy
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_brush_width(&mut self, width: f32) -> f32 {
        self.surface.set_brush_width(width)
    }

    pub fn pointer_down(&mut self, event: &PointerEvent, rect: CanvasRect) {
        self.sync_lock();
        if let Some(point) = event.to_canvas_local(rect) {
            self.surface.begin_stroke(point);
        }
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, rect: CanvasRect) {
        self.sync_lock();
        if let Some(point) = event.to_canvas_local(rect) {
            self.surface.extend_stroke(point);
        }
    }

    /// Pointer released or left the canvas
    pub fn pointer_up(&mut self) {
        self.surface.end_stroke();
    }

    /// Replay recorded gestures as if they had been brushed by hand
    pub fn apply_script(&mut self, script: &StrokeScript) {
        self.sync_lock();
        script.apply(&mut self.surface);
    }

    /// Wipe the highlight, keeping the source image
    pub fn clear_selection(&mut self) {
        self.surface.reset();
    }

    pub fn can_edit(&self) -> bool {
        let request = OperationRequest::edit(self.source.clone(), self.prompt.as_str());
        self.controller.can_submit(&request)
    }

    pub fn edit(&mut self) -> std::result::Result<OperationHandle, SubmitError> {
        let mut request = OperationRequest::edit(self.source.clone(), self.prompt.as_str());
        request.validate()?;

        if self.mask_policy == MaskPolicy::Attach && !self.surface.strokes().is_empty() {
            let mask = self.surface.render_stroke_mask(self.source_size)?;
            request = request.with_mask(codec::encode_png(&mask.into())?);
        }

        let handle = self.controller.submit(request)?;
        self.sync_lock();
        Ok(handle)
    }

    pub fn result(&self) -> Option<ImageAsset> {
        self.controller.state().image().cloned()
    }

    /// Drop the result and return to the brushed source image
    pub fn edit_again(&mut self) {
        self.controller.reset();
        self.surface.reset();
        self.sync_lock();
    }

    /// Forget the source image, prompt and result
    pub fn change_image(&mut self) {
        self.controller.reset();
        self.surface.unload();
        self.source = None;
        self.source_size = Size::default();
        self.prompt.clear();
        self.sync_lock();
    }

    pub fn download_name(&self) -> &'static str {
        EDIT_DOWNLOAD_NAME
    }

    fn sync_lock(&mut self) {
        self.surface.set_locked(self.controller.is_processing());
    }
}

/// Text-to-image workflow
pub struct GeneratorSession {
    prompt: String,
    controller: OperationController,
}

impl GeneratorSession {
    pub fn new(controller: OperationController) -> Self {
        Self {
            prompt: String::new(),
            controller,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn controller(&self) -> &OperationController {
        &self.controller
    }

    pub fn state(&self) -> OperationState {
        self.controller.state()
    }

    pub fn can_generate(&self) -> bool {
        self.controller.can_submit(&OperationRequest::generate(self.prompt.as_str()))
    }

    /// Start a generation; any previous image is cleared by the move to `Processing`
    pub fn generate(&mut self) -> std::result::Result<OperationHandle, SubmitError> {
        self.controller.submit(OperationRequest::generate(self.prompt.as_str()))
    }

    pub fn result(&self) -> Option<ImageAsset> {
        self.controller.state().image().cloned()
    }

    pub fn download_name(&self) -> String {
        generated_download_name(Utc::now())
    }
}

//! Ambient state handed to editor wrappers

use std::fmt;
use std::rc::Rc;

/// Severity of a message pushed to the message bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Critical,
    Success,
}

/// User-facing message sink
pub trait MessageBar {
    fn push_message(&self, title: &str, text: &str, level: MessageLevel);
}

/// Map view collaborator used by widgets that interact with the map
/// (e.g. picking a referenced feature)
pub trait MapCanvas {
    /// Id of the layer currently selected in the map view
    fn current_layer_id(&self) -> Option<String>;

    /// Zoom the view to a feature of a layer
    fn zoom_to_feature(&self, layer_id: &str, feature_id: i64);
}

/// What the attribute form is being used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    SingleEdit,
    AddFeature,
    MultiEdit,
    Search,
}

/// Context of the form an editor wrapper lives in
#[derive(Clone, Default)]
pub struct AttributeEditorContext {
    map_canvas: Option<Rc<dyn MapCanvas>>,
    message_bar: Option<Rc<dyn MessageBar>>,
    form_mode: FormMode,
    parent: Option<Box<AttributeEditorContext>>,
}

impl AttributeEditorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context of a form nested inside another one; collaborators are inherited
    pub fn nested(parent: &AttributeEditorContext) -> Self {
        Self {
            map_canvas: parent.map_canvas.clone(),
            message_bar: parent.message_bar.clone(),
            form_mode: parent.form_mode,
            parent: Some(Box::new(parent.clone())),
        }
    }

    pub fn with_map_canvas(mut self, canvas: Rc<dyn MapCanvas>) -> Self {
        self.map_canvas = Some(canvas);
        self
    }

    pub fn with_message_bar(mut self, bar: Rc<dyn MessageBar>) -> Self {
        self.message_bar = Some(bar);
        self
    }

    pub fn with_form_mode(mut self, mode: FormMode) -> Self {
        self.form_mode = mode;
        self
    }

    pub fn map_canvas(&self) -> Option<&Rc<dyn MapCanvas>> {
        self.map_canvas.as_ref()
    }

    pub fn message_bar(&self) -> Option<&Rc<dyn MessageBar>> {
        self.message_bar.as_ref()
    }

    pub fn form_mode(&self) -> FormMode {
        self.form_mode
    }

    pub fn parent(&self) -> Option<&AttributeEditorContext> {
        self.parent.as_deref()
    }

    /// Number of enclosing forms
    pub fn depth(&self) -> usize {
        self.parent.as_ref().map_or(0, |parent| parent.depth() + 1)
    }
}

impl fmt::Debug for AttributeEditorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeEditorContext")
            .field("map_canvas", &self.map_canvas.is_some())
            .field("message_bar", &self.message_bar.is_some())
            .field("form_mode", &self.form_mode)
            .field("depth", &self.depth())
            .finish()
    }
}

//! DOM surface: one absolutely positioned `div.firework` per particle

use std::collections::HashMap;

use fireworks_core::{Particle, ParticleId, Surface, SurfaceError, SurfaceSize};
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window};

/// Keyframes the particles run. `--x`/`--y` carry the displacement.
pub const FIREWORKS_CSS: &str = r#"
#fireworks { position: fixed; inset: 0; pointer-events: none; overflow: hidden; z-index: 1000; }
.firework {
    position: absolute;
    width: 4px;
    height: 4px;
    border-radius: 50%;
    box-shadow: 0 0 6px 2px currentColor;
    animation: explode var(--duration, 1500ms) ease-out forwards;
}
@keyframes explode {
    0% { transform: translate(0, 0); opacity: 1; }
    100% { transform: translate(var(--x), var(--y)); opacity: 0; }
}
"#;

const STYLE_ID: &str = "fireworks-style";

pub struct DomSurface {
    window: Window,
    document: Document,
    container: HtmlElement,
    elements: HashMap<ParticleId, HtmlElement>,
}

impl DomSurface {
    /// Attach to the element with `container_id`
    pub fn new(container_id: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| JsValue::from_str(&format!("Fireworks container '{}' not found", container_id)))?
            .dyn_into::<HtmlElement>()?;

        Ok(Self {
            window,
            document,
            container,
            elements: HashMap::new(),
        })
    }

    /// Add the particle stylesheet to `<head>` once
    pub fn install_styles(&self) -> Result<(), JsValue> {
        if self.document.get_element_by_id(STYLE_ID).is_some() {
            return Ok(());
        }
        let style = self.document.create_element("style")?;
        style.set_id(STYLE_ID);
        style.set_text_content(Some(FIREWORKS_CSS));
        let head = self.document.head().ok_or("No document head")?;
        head.append_child(&style)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn build(&self, particle: &Particle) -> Result<HtmlElement, JsValue> {
        let element = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlElement>()?;
        element.set_class_name("firework");

        let color = particle.color.as_hex();
        let style = element.style();
        style.set_property("left", &format!("{}px", particle.origin.x))?;
        style.set_property("top", &format!("{}px", particle.origin.y))?;
        style.set_property("background-color", &color)?;
        // currentColor drives the glow
        style.set_property("color", &color)?;
        style.set_property("--x", &format!("{}px", particle.displacement.x))?;
        style.set_property("--y", &format!("{}px", particle.displacement.y))?;
        style.set_property("--duration", &format!("{}ms", particle.lifetime_ms))?;
        Ok(element)
    }
}

impl Surface for DomSurface {
    fn size(&self) -> SurfaceSize {
        let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        SurfaceSize::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn attach(&mut self, particle: &Particle) -> Result<(), SurfaceError> {
        let reject = |e: JsValue| {
            SurfaceError::Rejected(particle.id, e.as_string().unwrap_or_else(|| format!("{:?}", e)))
        };
        let element = self.build(particle).map_err(reject)?;
        self.container.append_child(&element).map_err(reject)?;
        self.elements.insert(particle.id, element);
        Ok(())
    }

    fn detach(&mut self, id: ParticleId) {
        if let Some(element) = self.elements.remove(&id) {
            element.remove();
        }
    }
}

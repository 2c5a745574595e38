//! Browser tests for the DOM surface and the exported controller

use crate::{DomSurface, Fireworks};
use fireworks_core::{BurstId, Particle, ParticleId, Point, Surface, DEFAULT_PALETTE};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn container(id: &str) -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    if let Some(existing) = document.get_element_by_id(id) {
        existing.remove();
    }
    let div = document
        .create_element("div")
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    div.set_id(id);
    document.body().unwrap().append_child(&div).unwrap();
    div
}

fn particle(id: u64) -> Particle {
    Particle {
        id: ParticleId(id),
        burst: BurstId(0),
        origin: Point::new(12.0, 34.0),
        color: DEFAULT_PALETTE[6],
        angle: 0.0,
        velocity: 200.0,
        displacement: Point::new(200.0, 0.0),
        created_at: 0,
        lifetime_ms: 1500,
    }
}

#[wasm_bindgen_test]
fn test_missing_container_fails_fast() {
    assert!(Fireworks::new("no-such-container").is_err());
}

#[wasm_bindgen_test]
fn test_attach_sets_style_and_detach_removes() {
    let root = container("fw-surface");
    let mut surface = DomSurface::new("fw-surface").unwrap();

    surface.attach(&particle(1)).unwrap();
    assert_eq!(root.child_element_count(), 1);

    let child = root
        .first_element_child()
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    assert_eq!(child.class_name(), "firework");
    let style = child.style();
    assert_eq!(style.get_property_value("left").unwrap(), "12px");
    assert_eq!(style.get_property_value("--x").unwrap(), "200px");

    surface.detach(ParticleId(1));
    surface.detach(ParticleId(1));
    assert_eq!(root.child_element_count(), 0);
    assert!(surface.is_empty());
}

#[wasm_bindgen_test]
fn test_celebrate_and_stop() {
    let root = container("fw-controller");
    let mut fireworks = Fireworks::with_seed("fw-controller", 42).unwrap();

    fireworks.celebrate(1000.0).unwrap();
    assert_eq!(fireworks.state(), "running");
    assert_eq!(fireworks.tick(1000.0), 1);
    assert_eq!(root.child_element_count(), 50);

    assert!(fireworks.stop());
    assert!(!fireworks.stop());
    assert_eq!(root.child_element_count(), 0);
    assert!(fireworks.is_idle());
}

#[wasm_bindgen_test]
fn test_game_state_triggers_once() {
    container("fw-trigger");
    let mut fireworks = Fireworks::with_seed("fw-trigger", 7).unwrap();
    let won = r#"{"gameOver": true, "winner": "player1", "player1": "Alice"}"#;
    let draw = r#"{"gameOver": true, "winner": "draw"}"#;
    let fresh = r#"{"gameOver": false, "winner": ""}"#;

    assert!(!fireworks.on_game_state_json(draw, 0.0).unwrap());
    assert!(!fireworks.on_game_state_json(fresh, 0.0).unwrap());
    assert!(fireworks.on_game_state_json(won, 0.0).unwrap());
    assert!(!fireworks.on_game_state_json(won, 10.0).unwrap());

    fireworks.tick(300.0);
    assert!(fireworks.live_particles() > 0);

    // A new game clears the previous celebration
    assert!(!fireworks.on_game_state_json(fresh, 400.0).unwrap());
    assert_eq!(fireworks.live_particles(), 0);
    assert_eq!(fireworks.state(), "idle");
}

#[wasm_bindgen_test]
fn test_config_json_round_trip() {
    container("fw-config");
    let mut fireworks = Fireworks::with_seed("fw-config", 1).unwrap();
    fireworks
        .set_config_json(r#"{"particlesPerBurst": 8}"#)
        .unwrap();
    assert!(fireworks.config_json().contains("\"particlesPerBurst\":8"));
    assert!(fireworks.set_config_json(r#"{"palette": []}"#).is_err());

    fireworks.celebrate(0.0).unwrap();
    fireworks.tick(0.0);
    assert_eq!(fireworks.live_particles(), 8);
}

#[wasm_bindgen_test]
fn test_huge_timestamps_do_not_panic() {
    let root = container("fw-clock");
    let mut fireworks = Fireworks::with_seed("fw-clock", 3).unwrap();

    fireworks.celebrate(1e30).unwrap();
    assert_eq!(fireworks.tick(f64::INFINITY), 0);
    assert_eq!(fireworks.tick(1e30), 15);
    assert_eq!(fireworks.state(), "finished");
    assert_eq!(root.child_element_count(), 0);
}

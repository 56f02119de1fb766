//! Culling Demo
//!
//! Builds a field of randomly placed boxes in front of a camera, runs one
//! frame of cull -> add -> sort and reports what survived:
//! - Boxes outside the view frustum are rejected
//! - Distant boxes fall under the small-feature threshold
//! - Transparent boxes are drawn back to front after all opaque ones
//!
//! Usage: `cull_demo [settings.toml|settings.ron]`

use std::sync::Arc;

use drawable_collection::foundation::logging;
use drawable_collection::prelude::*;
use rand::Rng;
use thiserror::Error;

// Scene layout
const NUM_SHAPES: usize = 2_000;
const FIELD_HALF_WIDTH: f32 = 150.0;
const FIELD_DEPTH: f32 = 600.0;
const TRANSPARENT_RATIO: f64 = 0.3;

// Viewport
const VIEWPORT_WIDTH: f32 = 1280.0;
const VIEWPORT_HEIGHT: f32 = 720.0;

#[derive(Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),
}

/// Stand-in for a GPU backend: counts uploads per pass
#[derive(Default)]
struct CountingContext {
    opaque_setups: usize,
    transparent_setups: usize,
}

impl RenderContext for CountingContext {
    fn setup_shape(&mut self, drawable: &Drawable, _frame: &FrameSetup) -> Result<(), ContextError> {
        match drawable.sort_type() {
            SortType::Opaque => self.opaque_setups += 1,
            SortType::Transparent => self.transparent_setups += 1,
        }
        log::trace!("Set up {:?}", drawable.shape());
        Ok(())
    }
}

fn load_settings() -> Result<CullingSettings, DemoError> {
    let settings = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading culling settings from {}", path);
            CullingSettings::load_from_file(&path)?
        }
        None => CullingSettings::default().with_small_feature_threshold(2.0),
    };
    settings.validate()?;
    Ok(settings)
}

fn build_scene(rng: &mut impl Rng) -> Vec<(Arc<ShapeNode>, Mat4)> {
    (0..NUM_SHAPES)
        .map(|i| {
            let size = rng.gen_range(0.2..3.0);
            let mut node = ShapeNode::cuboid(format!("box_{i}"), Vec3::zeros(), Vec3::repeat(size));
            if rng.gen_bool(TRANSPARENT_RATIO) {
                node = node.with_appearance(Appearance::transparent());
            } else if rng.gen_bool(0.1) {
                node = node.with_appearance(Appearance::new("Opaque").with_sort_key(rng.gen_range(-2..=2)));
            }

            let position = Vec3::new(
                rng.gen_range(-FIELD_HALF_WIDTH..FIELD_HALF_WIDTH),
                rng.gen_range(-FIELD_HALF_WIDTH..FIELD_HALF_WIDTH),
                rng.gen_range(-FIELD_DEPTH..FIELD_DEPTH * 0.1),
            );
            (Arc::new(node), Mat4::new_translation(&position))
        })
        .collect()
}

fn run() -> Result<(), DemoError> {
    let settings = load_settings()?;
    log::info!("Culling settings: {:?}", settings);

    let viewpoint = PerspectiveViewpoint::from_degrees(60.0, 0.1, 1_000.0);
    let view = Mat4::look_at_rh(&Point3::new(0.0, 0.0, 20.0), &Point3::origin(), &Vec3::y());
    let frame = FrameSetup::new(
        view,
        viewpoint.projection(VIEWPORT_WIDTH / VIEWPORT_HEIGHT),
        VIEWPORT_HEIGHT,
        &viewpoint,
    )
    .with_settings(settings);
    frame.validate()?;

    let scene = build_scene(&mut rand::thread_rng());
    let Some((first_shape, _)) = scene.first() else {
        log::warn!("Empty scene, nothing to collect");
        return Ok(());
    };
    let mut context = CountingContext::default();

    let draw_list = {
        let mut collection = DrawableCollection::with_context(frame, &mut context);
        let mut state = GraphState::new(first_shape.clone());

        for (shape, transform) in &scene {
            state.rebind(shape.clone(), Mat4::identity());
            if collection.cull(transform, &mut state) {
                log::trace!("Culled {}", shape.name());
                continue;
            }
            collection.add_drawable(shape.clone(), transform, &mut state);
        }

        collection.sort();
        log::info!(
            "{} of {} shapes survived culling, {} drawables",
            collection.number_of_nodes(),
            scene.len(),
            collection.len()
        );
        collection.into_draw_list()?
    };

    log::info!(
        "GPU setup: {} opaque, {} transparent",
        context.opaque_setups,
        context.transparent_setups
    );

    if let Some(first_transparent) = draw_list.iter().position(|d| d.sort_type() == SortType::Transparent) {
        let farthest = draw_list[first_transparent].z_pos().unwrap_or_default();
        let nearest = draw_list.last().and_then(Drawable::z_pos).unwrap_or_default();
        log::info!(
            "Transparent pass starts at draw {} (z {:.1} -> {:.1})",
            first_transparent,
            farthest,
            nearest
        );
    }

    Ok(())
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

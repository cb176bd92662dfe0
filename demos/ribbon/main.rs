//! Pathframe ribbon demo — solves normals for a few paths and prints them.
//!
//! Usage:
//! ```text
//! cargo run --example ribbon                      # all paths
//! cargo run --example ribbon -- helix             # one path
//! RUST_LOG=pathframe=debug cargo run --example ribbon
//! ```

use pathframe::math::vector_3d::angle_between;
use pathframe::math::Point3;
use pathframe::{Path, PathframeError, RibbonStyle, TessellateRibbon};

fn helix() -> Result<Path, PathframeError> {
    let mut path = Path::new();
    let indices: Vec<usize> = (0..48)
        .map(|i| {
            let s = f64::from(i) * 0.25;
            path.add_vertex(Point3::new(2.0 * s.cos(), 0.4 * s, 2.0 * s.sin()))
        })
        .collect();
    path.add_segment_through(&indices, false, false)?;
    Ok(path)
}

fn l_shape() -> Result<Path, PathframeError> {
    let mut path = Path::new();
    let indices: Vec<usize> = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 2.0),
        Point3::new(0.0, 0.0, 4.0),
        Point3::new(2.0, 0.0, 4.0),
        Point3::new(4.0, 0.0, 4.0),
    ]
    .into_iter()
    .map(|p| path.add_vertex(p))
    .collect();
    path.add_segment_through(&indices, false, false)?;
    Ok(path)
}

/// Vertical run whose first tangent is parallel to up; reported as degenerate.
fn riser() -> Result<Path, PathframeError> {
    let mut path = Path::new();
    let indices: Vec<usize> = (0..4)
        .map(|i| path.add_vertex(Point3::new(0.0, f64::from(i), 0.0)))
        .collect();
    path.add_segment_through(&indices, false, false)?;
    Ok(path)
}

fn report(name: &str, path: &Path) -> Result<(), PathframeError> {
    let segment = path.segment(0)?;
    println!("{name}: {} vertices, length {:.3}", segment.len(), segment.length());

    let mut max_turn = 0.0_f64;
    for pair in segment.entries().windows(2) {
        max_turn = max_turn.max(angle_between(&pair[0].normal, &pair[1].normal));
    }
    println!("  max normal turn between entries: {max_turn:.4} rad");

    for entry in segment.entries().iter().take(3) {
        println!(
            "  v{:<3} s={:>7.3} normal=({:>6.3}, {:>6.3}, {:>6.3})",
            entry.vertex, entry.length, entry.normal.x, entry.normal.y, entry.normal.z
        );
    }

    let mesh = TessellateRibbon::from_segment(path, 0, RibbonStyle::new(0.5)?)?.execute()?;
    println!(
        "  ribbon: {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.indices.len()
    );
    Ok(())
}

fn main() -> Result<(), PathframeError> {
    // Default: WARN for everything, INFO for pathframe.
    // Override with RUST_LOG env var (e.g. RUST_LOG=pathframe=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("pathframe=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let only = std::env::args().nth(1);
    let builders: [(&str, fn() -> Result<Path, PathframeError>); 3] =
        [("helix", helix), ("l_shape", l_shape), ("riser", riser)];

    for (name, build) in builders {
        if only.as_deref().is_some_and(|o| o != name) {
            continue;
        }
        report(name, &build()?)?;
    }
    Ok(())
}

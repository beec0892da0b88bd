//! SVG export of a rendered scene: figure header, path data per shape, title text.

mod proj;
mod writer;

pub(crate) use proj::ring_to_path;
pub(crate) use writer::{write_scene_to_svg, write_scene_to_svg_string};

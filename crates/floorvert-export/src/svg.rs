//! Diagnostic SVG export.
//!
//! Draws the traced contours as closed `<path>` outlines and the merged
//! vertices as `<circle>` markers over a `viewBox` matching the source
//! image pixel grid, so the file can be laid over the input to inspect
//! what the pipeline found.
//!
//! Document construction, XML escaping and path data formatting go
//! through the [`svg`] crate. This is a pure function with no I/O: it
//! returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Group, Path, Title};
use svg::node::{Node, Text, Value};

use floorvert_pipeline::{Contour, Dimensions, Point};

/// Radius of the vertex markers, in source pixels.
const VERTEX_RADIUS: f64 = 3.0;

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped by the `svg`
/// crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Emitted as `<title>`, typically the input filename.
    pub title: Option<&'a str>,

    /// Emitted as `<desc>`, typically the pipeline parameters.
    pub description: Option<&'a str>,

    /// Serialized pipeline configuration, emitted inside `<metadata>`
    /// wrapped in a namespaced `<floorvert:pipeline>` element so the
    /// file carries machine-readable settings.
    pub config_json: Option<&'a str>,
}

/// Build a closed SVG path `d` attribute string from a contour.
///
/// Uses `M` for the first point, `L` for the rest, and closes back to
/// the start. Returns an empty string for contours with fewer than 2
/// points.
///
/// # Examples
///
/// ```
/// use floorvert_pipeline::{Contour, Point};
/// use floorvert_export::build_path_data;
///
/// let contour = Contour::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.0, 40.0),
/// ]);
/// let d = build_path_data(&contour);
/// assert!(d.starts_with("M10,20 L30,40"));
/// ```
#[must_use]
pub fn build_path_data(contour: &Contour) -> String {
    let points = contour.points();
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to((first.x, first.y));
    for p in rest {
        data = data.line_to((p.x, p.y));
    }
    String::from(Value::from(data.close()))
}

fn vertex_marker(vertex: Point) -> Circle {
    Circle::new()
        .set("cx", vertex.x)
        .set("cy", vertex.y)
        .set("r", VERTEX_RADIUS)
}

/// Serialize contours and vertices into a diagnostic SVG document.
///
/// Contours land in `<g id="contours">` as black unfilled outlines and
/// vertices in `<g id="vertices">` as magenta dots, in input order.
/// Contours with fewer than 2 points are skipped.
///
/// # Examples
///
/// ```
/// use floorvert_pipeline::{Contour, Dimensions, Point};
/// use floorvert_export::{SvgMetadata, to_diagnostic_svg};
///
/// let square = Contour::new(vec![
///     Point::new(10.0, 10.0),
///     Point::new(90.0, 10.0),
///     Point::new(90.0, 90.0),
///     Point::new(10.0, 90.0),
/// ]);
/// let dims = Dimensions { width: 100, height: 100 };
/// let metadata = SvgMetadata {
///     title: Some("plan.png"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_diagnostic_svg(&[square.clone()], square.points(), dims, &metadata);
/// assert!(svg.contains("<title>plan.png</title>"));
/// assert_eq!(svg.matches("<circle").count(), 4);
/// ```
#[must_use]
pub fn to_diagnostic_svg(
    contours: &[Contour],
    vertices: &[Point],
    dimensions: Dimensions,
    metadata: &SvgMetadata<'_>,
) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }
    if let Some(config_json) = metadata.config_json {
        let mut pipeline_el = Element::new("floorvert:pipeline");
        pipeline_el.assign("xmlns:floorvert", "https://floorvert.dev/ns/1");
        pipeline_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(pipeline_el);
        doc = doc.add(metadata_el);
    }

    let mut outlines = Group::new()
        .set("id", "contours")
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", 1);
    for contour in contours {
        let d = build_path_data(contour);
        if d.is_empty() {
            continue;
        }
        outlines = outlines.add(Path::new().set("d", d));
    }
    doc = doc.add(outlines);

    let markers = vertices
        .iter()
        .fold(Group::new().set("id", "vertices").set("fill", "magenta"), |g, &v| {
            g.add(vertex_marker(v))
        });
    doc = doc.add(markers);

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

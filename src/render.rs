// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

use plotters::prelude::*;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderStyle {
    /// Fill color of the nodes, as #rrggbb.
    pub node_color: String,
    /// Color of the node outlines, as #rrggbb.
    pub outline_color: String,
    /// Color of the edges, as #rrggbb.
    pub edge_color: String,
    /// Radius of the nodes, in pixels.
    pub node_radius: u32,
    /// Width of the edges, in pixels.
    pub edge_width: u32,
    /// Width and height of the image, in pixels.
    pub image_size: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            node_color: String::from("#377eb8"),
            outline_color: String::from("#000000"),
            edge_color: String::from("#000000"),
            node_radius: 14,
            edge_width: 1,
            image_size: 1200,
        }
    }
}

impl RenderStyle {
    /// Default style with the given node color.
    pub fn with_node_color(node_color: &str) -> Self {
        Self {
            node_color: node_color.to_string(),
            ..Default::default()
        }
    }

    fn valid(&self) -> anyhow::Result<()> {
        let mut errors = vec![];
        for (color, name) in [
            (&self.node_color, "node"),
            (&self.outline_color, "outline"),
            (&self.edge_color, "edge"),
        ] {
            if let Err(err) = parse_color(color) {
                errors.push(format!("{} color: {}", name, err));
            }
        }
        if self.node_radius == 0 {
            errors.push(String::from("vanishing node radius"));
        }
        if self.image_size <= 2 * self.node_radius {
            errors.push(format!(
                "image size ({}) too small for node radius ({})",
                self.image_size, self.node_radius
            ));
        }
        if !errors.is_empty() {
            anyhow::bail!("invalid render style: {}", errors.join(","))
        }
        Ok(())
    }
}

/// Parse a color in the #rrggbb format.
pub fn parse_color(color: &str) -> anyhow::Result<RGBColor> {
    let hex = color
        .strip_prefix('#')
        .ok_or_else(|| anyhow::anyhow!("missing leading '#' in {}", color))?;
    anyhow::ensure!(
        hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        "invalid color {}",
        color
    );
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Draw the nodes and edges of a topology on an SVG image, with the
/// canonical layout of the topology. Nothing else is drawn, i.e., there are
/// no axes, ticks, or labels, and the margin is equal to the node radius.
pub fn render_topology(
    topology: &crate::topology::Topology,
    style: &RenderStyle,
    path: &str,
) -> anyhow::Result<()> {
    style.valid()?;
    crate::utils::create_parent_dir(path)?;

    let node_color = parse_color(&style.node_color)?;
    let outline_color = parse_color(&style.outline_color)?;
    let edge_color = parse_color(&style.edge_color)?;

    let margin = style.node_radius as f64;
    let span = style.image_size as f64 - 2.0 * margin;
    let points: Vec<(i32, i32)> = topology
        .layout()
        .into_iter()
        .map(|(x, y)| {
            (
                (margin + x * span).round() as i32,
                (margin + y * span).round() as i32,
            )
        })
        .collect();

    let root = SVGBackend::new(path, (style.image_size, style.image_size)).into_drawing_area();
    root.fill(&WHITE)?;

    let graph = topology.graph();
    for edge in graph.raw_edges() {
        root.draw(&PathElement::new(
            vec![points[edge.source().index()], points[edge.target().index()]],
            edge_color.stroke_width(style.edge_width),
        ))?;
    }
    for point in &points {
        root.draw(&Circle::new(
            *point,
            style.node_radius,
            node_color.filled(),
        ))?;
        root.draw(&Circle::new(*point, style.node_radius, outline_color))?;
    }

    root.present()?;
    log::info!(
        "saved {} with {} nodes and {} edges to {}",
        topology.kind(),
        graph.node_count(),
        graph.edge_count(),
        path
    );
    Ok(())
}

/// Render the Chimera and Pegasus topologies of `config` to SVG files whose
/// names are prefixed by `output_path`, which may be empty.
///
/// If `save_dot` is true, the graphs are also saved in DOT format, with the
/// same file names and extension `.dot`. Return the paths of the files
/// written.
pub fn render_topologies(
    config: &crate::user_config::UserConfig,
    output_path: &str,
    save_dot: bool,
) -> anyhow::Result<Vec<String>> {
    let topologies = [
        (
            crate::topology::Topology::chimera(config.chimera.clone())?,
            &config.chimera_style,
            &config.chimera_filename,
        ),
        (
            crate::topology::Topology::pegasus(config.pegasus.clone())?,
            &config.pegasus_style,
            &config.pegasus_filename,
        ),
    ];

    let mut paths = vec![];
    for (topology, style, filename) in topologies {
        log::info!(
            "{}: {} qubits, {} couplers",
            topology.kind(),
            topology.graph().node_count(),
            topology.graph().edge_count()
        );
        let path = format!("{}{}", output_path, filename);
        render_topology(&topology, style, &path)?;
        paths.push(path);

        if save_dot {
            let dot_filename = match filename.rsplit_once('.') {
                Some((stem, _extension)) => format!("{}.dot", stem),
                None => format!("{}.dot", filename),
            };
            let path = crate::utils::save_to_file(output_path, &dot_filename, &topology.to_dot())?;
            log::info!("saved {} to {}", topology.kind(), path);
            paths.push(path);
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() -> anyhow::Result<()> {
        assert_eq!(RGBColor(0x37, 0x7e, 0xb8), parse_color("#377eb8")?);
        assert_eq!(RGBColor(0xe4, 0x1a, 0x1c), parse_color("#E41A1C")?);
        assert!(parse_color("377eb8").is_err());
        assert!(parse_color("#377eb").is_err());
        assert!(parse_color("#37 7eb8").is_err());
        assert!(parse_color("#377eg8").is_err());
        Ok(())
    }

    #[test]
    fn test_render_style_valid() {
        assert!(RenderStyle::default().valid().is_ok());
        assert!(RenderStyle::with_node_color("red").valid().is_err());
        assert!(RenderStyle {
            node_radius: 0,
            ..Default::default()
        }
        .valid()
        .is_err());
        assert!(RenderStyle {
            image_size: 10,
            node_radius: 5,
            ..Default::default()
        }
        .valid()
        .is_err());
    }

    #[test]
    fn test_render_topology() -> anyhow::Result<()> {
        let topology = crate::tests::chimera_3_3_4();
        let path = crate::tests::temp_path("render/chimera.svg");
        render_topology(&topology, &RenderStyle::with_node_color("#377eb8"), &path)?;

        let content = std::fs::read_to_string(&path)?;
        assert!(content.contains("<svg"));
        assert!(content.contains("<circle"));
        assert!(!content.contains("<text"));
        let _ = std::fs::remove_file(&path);

        assert!(render_topology(&topology, &RenderStyle::with_node_color("blue"), &path).is_err());

        let topology = crate::tests::pegasus_3();
        let path = crate::tests::temp_path("render/pegasus.svg");
        render_topology(&topology, &RenderStyle::with_node_color("#e41a1c"), &path)?;
        let content = std::fs::read_to_string(&path)?;
        assert!(content.contains("<svg"));
        // Each node is drawn twice: fill and outline.
        assert_eq!(2 * 128, content.matches("<circle").count());
        assert_eq!(704, content.matches("<polyline").count());
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn test_render_topologies() -> anyhow::Result<()> {
        let output_path = format!("{}/", crate::tests::temp_path("render_all"));
        let config = crate::user_config::UserConfig::default();

        let paths = render_topologies(&config, &output_path, false)?;
        assert_eq!(
            vec![
                format!("{}chimera.svg", output_path),
                format!("{}pegasus.svg", output_path)
            ],
            paths
        );
        for (path, num_nodes, num_edges, color) in [
            (&paths[0], 72, 192, "#377EB8"),
            (&paths[1], 128, 704, "#E41A1C"),
        ] {
            let content = std::fs::read_to_string(path)?;
            assert_eq!(2 * num_nodes, content.matches("<circle").count(), "{}", path);
            assert_eq!(num_edges, content.matches("<polyline").count(), "{}", path);
            assert!(content.contains(color), "{}", path);
        }

        let paths = render_topologies(&config, &output_path, true)?;
        assert_eq!(4, paths.len());
        assert!(paths[1].ends_with("chimera.dot"));
        assert!(paths[3].ends_with("pegasus.dot"));
        assert!(std::fs::read_to_string(&paths[3])?.starts_with("graph {"));

        for path in paths {
            let _ = std::fs::remove_file(&path);
        }
        Ok(())
    }
}

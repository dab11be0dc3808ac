//! Self-contained interactive HTML documents.
//!
//! Two document kinds are produced, neither loading anything from the
//! network:
//! - a chart page stacking the plotters layers of a [`Figure`] (see
//!   [`crate::plot::figure_layers`]), where clicking a legend row hides or
//!   shows its trace and hovering a point shows its tooltip;
//! - an animated heatmap page: frames are embedded as JSON and drawn on a
//!   canvas, with a slider keyed by frame label and Play/Pause buttons.

use std::fmt::Write as _;

use serde::Serialize;
use viz_common::ColorRamp;

use crate::chart::Figure;
use crate::error::RenderResult;
use crate::heatmap::ColorScale;
use crate::plot::{figure_layers, HoverPoint};

/// Escape text for element content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON for an inline script; "</" would end the script element early.
fn script_json<T: Serialize>(value: &T) -> RenderResult<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

const CHART_STYLE: &str = "body{margin:0;background:#fff;font-family:sans-serif;color:#262626}\
#chart{position:relative}#chart .layer{position:absolute;left:0;top:0}#chart svg{display:block}\
#tooltip{position:absolute;display:none;pointer-events:none;background:#fff;border:1px solid #888;\
padding:2px 6px;font-size:12px;white-space:nowrap}\
#legend{list-style:none;margin:8px 12px;padding:0;display:flex;flex-wrap:wrap;gap:6px 18px}\
.legend-item{cursor:pointer;user-select:none}.legend-item:hover{text-decoration:underline}\
.swatch{display:inline-block;width:14px;height:14px;margin-right:6px;vertical-align:middle}";

const CHART_SCRIPT: &str = r#"
(function () {
  var chart = document.getElementById('chart');
  var tooltip = document.getElementById('tooltip');
  var hidden = {};
  document.querySelectorAll('.legend-item').forEach(function (item) {
    item.addEventListener('click', function () {
      var id = item.getAttribute('data-series');
      var layer = chart.querySelector('.layer[data-series="' + id + '"]');
      if (!layer) { return; }
      hidden[id] = !hidden[id];
      layer.style.display = hidden[id] ? 'none' : '';
      item.style.opacity = hidden[id] ? '0.4' : '1';
    });
  });
  chart.addEventListener('mousemove', function (ev) {
    var rect = chart.getBoundingClientRect();
    var mx = ev.clientX - rect.left, my = ev.clientY - rect.top;
    var best = null, bestDist = 8;
    HOVER.forEach(function (p) {
      if (hidden[p.series]) { return; }
      var d = p.x === null ? Math.abs(my - p.y) : Math.hypot(mx - p.x, my - p.y);
      if (d <= bestDist) { best = p; bestDist = d; }
    });
    if (best === null) { tooltip.style.display = 'none'; return; }
    tooltip.textContent = best.text;
    tooltip.style.left = (mx + 12) + 'px';
    tooltip.style.top = (my + 12) + 'px';
    tooltip.style.display = 'block';
  });
  chart.addEventListener('mouseleave', function () { tooltip.style.display = 'none'; });
})();
"#;

/// Interactive page for a chart.
pub fn chart_document(figure: &Figure) -> RenderResult<String> {
    let layers = figure_layers(figure)?;

    let mut chart = String::new();
    let _ = write!(
        chart,
        "<div id=\"chart\" style=\"width:{}px;height:{}px\">\n<div class=\"layer\">{}</div>\n",
        figure.width, figure.height, layers.base
    );
    for layer in &layers.traces {
        let _ = write!(
            chart,
            "<div class=\"layer\" data-series=\"{}\">{}</div>\n",
            layer.index, layer.svg
        );
    }
    chart.push_str("<div id=\"tooltip\"></div>\n</div>\n");

    let mut legend = String::from("<ul id=\"legend\">\n");
    for (index, trace) in figure.legend_entries() {
        let _ = writeln!(
            legend,
            "<li class=\"legend-item\" data-series=\"{}\"><span class=\"swatch\" style=\"background:{}\"></span>{}</li>",
            index,
            trace.color.to_hex(),
            escape_xml(trace.name.as_deref().unwrap_or_default())
        );
    }
    legend.push_str("</ul>\n");

    let hover: Vec<&HoverPoint> = layers.traces.iter().flat_map(|l| &l.hover).collect();
    Ok(format!(
        "<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
<style>{style}</style>\n</head>\n<body>\n{chart}{legend}<script>const HOVER = {hover};\n{script}</script>\n</body>\n</html>\n",
        title = escape_xml(&figure.title),
        style = CHART_STYLE,
        chart = chart,
        legend = legend,
        hover = script_json(&hover)?,
        script = CHART_SCRIPT
    ))
}

/// One frame of an animated heatmap page.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapDocFrame {
    /// Slider label ("2034", "2020-2040").
    pub name: String,
    /// Row-major rows; `null` where undefined.
    pub z: Vec<Vec<Option<f32>>>,
}

/// Content of an animated heatmap page.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapDocument {
    pub title: String,
    pub colorbar_title: String,
    pub slider_prefix: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    /// Display time of one frame during playback.
    pub frame_duration_ms: u32,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub zmin: f32,
    pub zmax: f32,
    /// Ramp stops from `zmin` to `zmax`, as "#rrggbb".
    pub colorscale: Vec<String>,
    pub frames: Vec<HeatmapDocFrame>,
}

impl HeatmapDocument {
    /// Empty document over the given axes and colour scale.
    pub fn new(title: impl Into<String>, x: Vec<f64>, y: Vec<f64>, scale: &ColorScale) -> Self {
        Self {
            title: title.into(),
            colorbar_title: String::new(),
            slider_prefix: String::new(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            width: 800,
            height: 600,
            frame_duration_ms: 200,
            x,
            y,
            zmin: scale.min,
            zmax: scale.max,
            colorscale: ramp_hex(scale.ramp),
            frames: Vec::new(),
        }
    }

    pub fn push_frame(&mut self, name: impl Into<String>, z: Vec<Vec<Option<f32>>>) {
        self.frames.push(HeatmapDocFrame {
            name: name.into(),
            z,
        });
    }

    /// Render the page.
    pub fn to_html(&self) -> RenderResult<String> {
        let data = script_json(self)?;
        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
<style>{style}</style>\n</head>\n<body>\n\
<div id=\"figure\">\n<h2>{title}</h2>\n\
<div class=\"controls\"><button id=\"play\">Play</button><button id=\"pause\">Pause</button></div>\n\
<div class=\"plot\"><canvas id=\"heatmap\"></canvas><canvas id=\"colorbar\" width=\"90\"></canvas></div>\n\
<div id=\"readout\">&nbsp;</div>\n\
<div class=\"slider\"><span id=\"current\"></span><input id=\"slider\" type=\"range\" min=\"0\" step=\"1\"></div>\n\
</div>\n<script>const DATA = {data};\n{script}</script>\n</body>\n</html>\n",
            title = escape_xml(&self.title),
            style = HEATMAP_STYLE,
            data = data,
            script = HEATMAP_SCRIPT
        ))
    }
}

/// Hex stops of a ramp.
pub fn ramp_hex(ramp: ColorRamp) -> Vec<String> {
    ramp.stops().iter().map(|c| c.to_hex()).collect()
}

const HEATMAP_STYLE: &str = "body{margin:0;font-family:sans-serif;background:#fff;color:#262626}\
#figure{padding:12px}h2{font-weight:normal;margin:4px 0 8px}\
.plot{display:flex;align-items:flex-start;gap:8px}\
.controls{margin-bottom:6px}.controls button{margin-right:6px}\
.slider{margin-top:8px}.slider input{width:100%}#current{font-size:16px}";

const HEATMAP_SCRIPT: &str = r#"
(function () {
  var canvas = document.getElementById('heatmap');
  var bar = document.getElementById('colorbar');
  var slider = document.getElementById('slider');
  var current = document.getElementById('current');
  var readout = document.getElementById('readout');
  var ctx = canvas.getContext('2d');
  var nx = DATA.x.length, ny = DATA.y.length;
  var yAscending = ny < 2 || DATA.y[ny - 1] >= DATA.y[0];
  canvas.width = Math.max(DATA.width - 110, 100);
  canvas.height = Math.max(DATA.height - 120, 100);
  bar.height = canvas.height;

  function hexToRgb(h) {
    return [parseInt(h.substr(1, 2), 16), parseInt(h.substr(3, 2), 16), parseInt(h.substr(5, 2), 16)];
  }
  var stops = DATA.colorscale.map(hexToRgb);

  function colorAt(t) {
    t = Math.min(1, Math.max(0, t));
    var pos = t * (stops.length - 1);
    var i = Math.min(Math.floor(pos), stops.length - 2);
    var f = pos - i;
    var a = stops[i], b = stops[i + 1];
    return 'rgb(' + Math.round(a[0] + (b[0] - a[0]) * f) + ',' +
      Math.round(a[1] + (b[1] - a[1]) * f) + ',' + Math.round(a[2] + (b[2] - a[2]) * f) + ')';
  }

  function norm(v) {
    var span = DATA.zmax - DATA.zmin;
    return span > 0 ? (v - DATA.zmin) / span : 0;
  }

  var cw = canvas.width / nx, ch = canvas.height / ny;

  function draw(index) {
    var frame = DATA.frames[index];
    ctx.clearRect(0, 0, canvas.width, canvas.height);
    for (var r = 0; r < ny; r++) {
      var row = frame.z[r];
      var py = yAscending ? (ny - 1 - r) * ch : r * ch;
      for (var c = 0; c < nx; c++) {
        var v = row[c];
        if (v === null || v === undefined) { continue; }
        ctx.fillStyle = colorAt(norm(v));
        ctx.fillRect(c * cw, py, Math.ceil(cw), Math.ceil(ch));
      }
    }
    slider.value = index;
    current.textContent = DATA.slider_prefix + frame.name;
  }

  function drawBar() {
    var bctx = bar.getContext('2d');
    for (var p = 0; p < bar.height; p++) {
      bctx.fillStyle = colorAt(1 - p / (bar.height - 1));
      bctx.fillRect(0, p, 20, 1);
    }
    bctx.fillStyle = '#262626';
    bctx.font = '12px sans-serif';
    bctx.fillText(String(DATA.zmax.toFixed(0)), 24, 12);
    bctx.fillText(String(DATA.zmin.toFixed(0)), 24, bar.height - 2);
    bctx.save();
    bctx.translate(80, bar.height / 2);
    bctx.rotate(-Math.PI / 2);
    bctx.textAlign = 'center';
    bctx.fillText(DATA.colorbar_title, 0, 0);
    bctx.restore();
  }

  canvas.addEventListener('mousemove', function (ev) {
    var rect = canvas.getBoundingClientRect();
    var c = Math.floor((ev.clientX - rect.left) / cw);
    var py = Math.floor((ev.clientY - rect.top) / ch);
    var r = yAscending ? ny - 1 - py : py;
    if (c < 0 || c >= nx || r < 0 || r >= ny) { return; }
    var v = DATA.frames[+slider.value].z[r][c];
    readout.textContent = DATA.x_label + ': ' + DATA.x[c] + '  ' + DATA.y_label + ': ' + DATA.y[r] +
      '  ' + DATA.colorbar_title + ': ' + (v === null ? '-' : v.toFixed(1));
  });

  var timer = null;
  function stop() { if (timer !== null) { clearInterval(timer); timer = null; } }
  document.getElementById('play').addEventListener('click', function () {
    stop();
    timer = setInterval(function () {
      var next = +slider.value + 1;
      if (next >= DATA.frames.length) { stop(); return; }
      draw(next);
    }, DATA.frame_duration_ms);
  });
  document.getElementById('pause').addEventListener('click', stop);
  slider.addEventListener('input', function () { stop(); draw(+slider.value); });

  slider.max = DATA.frames.length - 1;
  drawBar();
  if (DATA.frames.length > 0) { draw(0); }
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\" l'd"), "a&lt;b &amp; &quot;c&quot; l&#39;d");
    }

    #[test]
    fn test_script_safe_json() {
        let scale = ColorScale::new(0.0, 10.0, ColorRamp::Reds);
        let mut doc = HeatmapDocument::new("a</script>b", vec![0.0], vec![0.0], &scale);
        doc.push_frame("</script>", vec![vec![Some(1.0)]]);
        let html = doc.to_html().unwrap();
        assert_eq!(html.matches("</script>").count(), 1);
        assert!(html.contains("<title>a&lt;/script&gt;b</title>"));
    }
}

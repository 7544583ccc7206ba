use arpra_tools::plot::figure::BLUE;
use arpra_tools::plot::{render, Figure, Panel, Series};

fn svg_texts(svg: &str) -> Vec<String> {
    svg.split("<text")
        .skip(1)
        .filter_map(|tag| {
            let body = &tag[tag.find('>')? + 1..];
            Some(body[..body.find("</text>")?].trim().to_string())
        })
        .collect()
}

#[test]
fn log_axis_labels_each_decade_once() {
    let x: Vec<f64> = (0..=100).map(f64::from).collect();
    let y: Vec<f64> = x.iter().map(|v| 1e-6 * 10f64.powf(v / 25.0)).collect();
    let fig = Figure::new("", 1, 1)
        .size(600, 400)
        .with(Panel::lines(vec![Series::from_xy(BLUE, &x, &y)]).title("difference").log_y());

    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("log.svg");
    render(&fig, &path).unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    let mut decades: Vec<String> = svg_texts(&svg)
        .into_iter()
        .filter(|t| t.contains('e') && t.parse::<f64>().is_ok())
        .collect();
    decades.sort_by(|a, b| a.parse::<f64>().unwrap().total_cmp(&b.parse::<f64>().unwrap()));
    assert_eq!(decades, ["1e-6", "1e-5", "1e-4", "1e-3", "1e-2"]);
}

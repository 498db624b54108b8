use std::io::Write;

use dasher_engine::element::presentation::Presentation;
use serde::Serialize;

fn main() {
    let data = std::fs::read("manifest.mpd").unwrap();
    let mpd = String::from_utf8(data).unwrap();
    let presentation: Presentation = quick_xml::de::from_str(&mpd).unwrap();
    println!("{presentation:?}");

    let mut xml = String::new();
    let mut ser = quick_xml::se::Serializer::new(&mut xml);
    ser.indent(' ', 2);
    presentation.serialize(ser).unwrap();

    let mut file = std::fs::File::create("manifest_copy.mpd").unwrap();
    file.write_all(xml.as_bytes()).unwrap();
}

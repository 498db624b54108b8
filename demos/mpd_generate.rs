use std::io::Write;
use std::str::FromStr;

use dasher_engine::definition::Profile;
use dasher_engine::element::adapt::AdaptationSetBuilder;
use dasher_engine::element::period::PeriodBuilder;
use dasher_engine::element::presentation::PresentationBuilder;
use dasher_engine::element::repr::RepresentationBuilder;
use dasher_engine::element::segment::{SegmentTemplateBuilder, SegmentTimelineBuilder};
use dasher_engine::element::DescriptorBuilder;
use dasher_engine::types::{RFC6838ContentType, StreamAccessPoint, StringNoWhitespace, StringVector, XsDuration};
use serde::Serialize;

fn main() {
    let mut timeline = SegmentTimelineBuilder::default().build().unwrap();
    timeline.push_closed_segment(0, 15_000);
    timeline.push_closed_segment(15_000, 15_000);

    let segment_template = SegmentTemplateBuilder::default()
        .initialization_attribute("$RepresentationID$.cmfi")
        .media("$RepresentationID$/$Time$.cmfv")
        .timescale(3000u32)
        .segment_timeline(timeline)
        .build()
        .unwrap();

    let representation = RepresentationBuilder::default()
        .id(StringNoWhitespace::from_str("720p").unwrap())
        .codecs("avc1.4d0028")
        .bandwidth(4_000_000u32)
        .width(1280u32)
        .height(720u32)
        .build()
        .unwrap();

    let role = DescriptorBuilder::default()
        .scheme_id_uri(dasher_engine::definition::ROLE_SCHEME)
        .value("main")
        .build()
        .unwrap();

    let adapt = AdaptationSetBuilder::default()
        .content_type(RFC6838ContentType::Video)
        .segment_alignment(true)
        .bitstream_switching(true)
        .mime_type("video/mp4")
        .start_with_sap(StreamAccessPoint::Type1)
        .role(vec![role])
        .representation(vec![representation])
        .build()
        .unwrap();

    let period = PeriodBuilder::default()
        .id("p0")
        .start(XsDuration::from("PT0S"))
        .adaptation_set(vec![adapt])
        .build()
        .unwrap();

    let presentation = PresentationBuilder::default()
        .r#type(dasher_engine::definition::PresentationType::Dynamic)
        .availability_start_time(chrono::Utc::now())
        .publish_time(chrono::Utc::now())
        .profiles(StringVector::from(vec![Profile::Cmaf.to_string()]))
        .period(vec![period])
        .build()
        .unwrap();

    println!("{presentation:?}");

    let mut xml = String::new();
    let mut ser = quick_xml::se::Serializer::new(&mut xml);
    ser.indent(' ', 2);
    presentation.serialize(ser).unwrap();

    let xml = format!("{}\n{xml}", dasher_engine::definition::XML_DECLARATION);

    let mut file = std::fs::File::create("manifest.mpd").unwrap();
    file.write_all(xml.as_bytes()).unwrap();
}

//! Builders for the edit API's XML documents. Every document has an `osm`
//! root, one changeset/node/way element carrying the changeset id (plus the
//! object id and version for updates), and a `tag` child per key/value pair.
//! Ways additionally nest one `nd` reference per constituent node, in path
//! order.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use geom::LonLat;
use osm_model::osm::NodeID;
use osm_model::Tags;

pub fn changeset_doc(created_by: &str, comment: &str) -> String {
    build(|w| {
        w.write_event(Event::Start(BytesStart::new("changeset")))?;
        tag(w, "created_by", created_by)?;
        tag(w, "comment", comment)?;
        w.write_event(Event::End(BytesEnd::new("changeset")))
    })
}

/// `id_version` is `None` for creation, `Some` for an update.
pub fn node_doc(
    changeset_id: i64,
    id_version: Option<(i64, i32)>,
    pt: LonLat,
    tags: &Tags,
) -> String {
    build(|w| {
        let mut el = BytesStart::new("node");
        let changeset = changeset_id.to_string();
        el.push_attribute(("changeset", changeset.as_str()));
        if let Some((id, version)) = id_version {
            let (id, version) = (id.to_string(), version.to_string());
            el.push_attribute(("id", id.as_str()));
            el.push_attribute(("version", version.as_str()));
            el.push_attribute(("visible", "true"));
        }
        let (lat, lon) = (pt.latitude.to_string(), pt.longitude.to_string());
        el.push_attribute(("lat", lat.as_str()));
        el.push_attribute(("lon", lon.as_str()));
        w.write_event(Event::Start(el))?;
        for (k, v) in tags.iter() {
            tag(w, k, v)?;
        }
        w.write_event(Event::End(BytesEnd::new("node")))
    })
}

pub fn way_doc(
    changeset_id: i64,
    id_version: Option<(i64, i32)>,
    nodes: &[NodeID],
    tags: &Tags,
) -> String {
    build(|w| {
        let mut el = BytesStart::new("way");
        let changeset = changeset_id.to_string();
        el.push_attribute(("changeset", changeset.as_str()));
        if let Some((id, version)) = id_version {
            let (id, version) = (id.to_string(), version.to_string());
            el.push_attribute(("id", id.as_str()));
            el.push_attribute(("version", version.as_str()));
        }
        el.push_attribute(("visible", "true"));
        w.write_event(Event::Start(el))?;
        for (k, v) in tags.iter() {
            tag(w, k, v)?;
        }
        for node in nodes {
            let mut nd = BytesStart::new("nd");
            let r = node.0.to_string();
            nd.push_attribute(("ref", r.as_str()));
            w.write_event(Event::Empty(nd))?;
        }
        w.write_event(Event::End(BytesEnd::new("way")))
    })
}

fn tag<W: std::io::Write>(w: &mut Writer<W>, k: &str, v: &str) -> quick_xml::Result<()> {
    let mut el = BytesStart::new("tag");
    el.push_attribute(("k", k));
    el.push_attribute(("v", v));
    w.write_event(Event::Empty(el))
}

fn build<F>(body: F) -> String
where
    F: FnOnce(&mut Writer<Cursor<Vec<u8>>>) -> quick_xml::Result<()>,
{
    let mut w = Writer::new(Cursor::new(Vec::new()));
    // Writing into memory can't actually fail
    w.write_event(Event::Start(BytesStart::new("osm"))).unwrap();
    body(&mut w).unwrap();
    w.write_event(Event::End(BytesEnd::new("osm"))).unwrap();
    String::from_utf8(w.into_inner().into_inner()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changeset_document() {
        assert_eq!(
            "<osm><changeset>\
             <tag k=\"created_by\" v=\"mapnote\"/>\
             <tag k=\"comment\" v=\"add entrance\"/>\
             </changeset></osm>",
            changeset_doc("mapnote", "add entrance")
        );
    }

    #[test]
    fn node_creation_document() {
        let mut tags = Tags::new();
        tags.insert("entrance", "yes");
        assert_eq!(
            "<osm><node changeset=\"42\" lat=\"60.17\" lon=\"24.94\">\
             <tag k=\"entrance\" v=\"yes\"/>\
             </node></osm>",
            node_doc(42, None, LonLat::new(24.94, 60.17), &tags)
        );
    }

    #[test]
    fn node_update_document_carries_id_and_version() {
        let doc = node_doc(42, Some((7, 3)), LonLat::new(24.94, 60.17), &Tags::new());
        assert!(doc.contains("id=\"7\""));
        assert!(doc.contains("version=\"3\""));
        assert!(doc.contains("visible=\"true\""));
    }

    #[test]
    fn way_document_keeps_node_order() {
        let doc = way_doc(42, None, &[NodeID(5), NodeID(3)], &Tags::new());
        let five = doc.find("ref=\"5\"").unwrap();
        let three = doc.find("ref=\"3\"").unwrap();
        assert!(five < three);
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut tags = Tags::new();
        tags.insert("name", "Bar \"<&>\"");
        let doc = node_doc(1, None, LonLat::new(0.0, 0.0), &tags);
        assert!(doc.contains("&quot;&lt;&amp;&gt;&quot;"));
        assert!(!doc.contains("\"<&>\""));
    }
}

//! The changeset edit client: open a changeset, create and update nodes and
//! ways under optimistic versioning, and commit entrance plans in causal
//! order (a node has to exist before a way can reference it).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use geom::LonLat;
use osm_model::osm::{self, NodeID, WayID};
use osm_model::{Changeset, EntrancePlan, GeoFeature, Node, Tags, Way};

use crate::error::ApiError;
use crate::xml;

/// The `created_by` tag stamped on every changeset this client opens.
pub const CREATED_BY: &str = "mapnote";

/// Basic-auth credentials for the edit API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One editing session against the edit API. Deliberately an explicit object,
/// not process-wide state, so concurrent sessions (and tests) can't trample
/// each other. The changeset id is assigned by the server on open and reused
/// by every subsequent edit in the session.
pub struct EditSession {
    api_url: String,
    credentials: Credentials,
    client: reqwest::Client,
    changeset: Option<Changeset>,
    // Nodes known to exist remotely: created here, or observed in query
    // results. A new way may only reference these.
    confirmed_nodes: BTreeSet<NodeID>,
}

impl EditSession {
    pub fn new(api_url: &str, credentials: Credentials) -> EditSession {
        EditSession {
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
            client: reqwest::Client::new(),
            changeset: None,
            confirmed_nodes: BTreeSet::new(),
        }
    }

    /// Continues editing against a changeset opened earlier; the id survives
    /// restarts via `SessionStore`.
    pub fn resume(
        api_url: &str,
        credentials: Credentials,
        changeset_id: i64,
        comment: &str,
    ) -> EditSession {
        let mut session = EditSession::new(api_url, credentials);
        session.changeset = Some(Changeset::new(changeset_id, comment));
        session
    }

    pub fn changeset(&self) -> Option<&Changeset> {
        self.changeset.as_ref()
    }

    /// Marks features fetched from the remote service as safe to reference in
    /// new ways.
    pub fn observe(&mut self, features: &[GeoFeature]) {
        for f in features {
            match f {
                GeoFeature::Node(n) => {
                    self.confirmed_nodes.insert(n.id);
                }
                GeoFeature::Way(w) => {
                    self.confirmed_nodes.extend(w.nodes.iter().copied());
                }
                GeoFeature::Relation(_) => {}
            }
        }
    }

    /// Opens a fresh changeset and stores its id for the rest of the session.
    ///
    /// The protocol has no idempotency token: if this times out after the
    /// server already opened the changeset, retrying opens a second one.
    /// That's why nothing in this client retries automatically.
    pub async fn open_changeset(&mut self, comment: &str) -> Result<i64, ApiError> {
        let doc = xml::changeset_doc(CREATED_BY, comment);
        let body = self.put("changeset/create", doc).await?;
        let id = parse_numeric_body(&body)?;
        info!("opened changeset {}", id);
        self.changeset = Some(Changeset::new(id, comment));
        Ok(id)
    }

    pub async fn create_node(&mut self, pt: LonLat, tags: Tags) -> Result<Node, ApiError> {
        let changeset_id = self.open_id()?;
        let doc = xml::node_doc(changeset_id, None, pt, &tags);
        let body = self.put("node/create", doc).await?;
        let id = NodeID(parse_numeric_body(&body)?);
        let node = Node {
            id,
            version: Some(1),
            pt,
            tags,
        };
        self.confirmed_nodes.insert(id);
        self.record(|c| c.created.push(GeoFeature::Node(node.clone())));
        Ok(node)
    }

    /// Fails before any network call if a referenced node isn't confirmed to
    /// exist yet; node creation has to be sequenced before the way that uses
    /// it, within the same changeset.
    pub async fn create_way(&mut self, nodes: Vec<NodeID>, tags: Tags) -> Result<Way, ApiError> {
        let changeset_id = self.open_id()?;
        if let Some(missing) = nodes.iter().find(|id| !self.confirmed_nodes.contains(id)) {
            return Err(ApiError::UnknownNode(*missing));
        }
        let doc = xml::way_doc(changeset_id, None, &nodes, &tags);
        let body = self.put("way/create", doc).await?;
        let way = Way {
            id: WayID(parse_numeric_body(&body)?),
            version: Some(1),
            nodes,
            // The caller has the resolved points if it needs them
            pts: Vec::new(),
            tags,
        };
        self.record(|c| c.created.push(GeoFeature::Way(way.clone())));
        Ok(way)
    }

    /// Replaces the node's tags. The update document must carry the node's
    /// current version; a concurrent edit turns into `ApiError::Conflict` and
    /// the caller has to re-fetch before retrying. On success the returned
    /// copy carries the server's new version. The argument is never mutated,
    /// so a failed call leaves nothing to roll back.
    pub async fn update_node(&mut self, node: &Node, tags: Tags) -> Result<Node, ApiError> {
        let changeset_id = self.open_id()?;
        let version = node
            .version
            .unwrap_or_else(|| panic!("can't update {} without a version", node.id));
        let doc = xml::node_doc(changeset_id, Some((node.id.0, version)), node.pt, &tags);
        let body = self.put(&format!("node/{}", node.id.0), doc).await?;
        let new_version = parse_numeric_body(&body)? as i32;
        let updated = Node {
            id: node.id,
            version: Some(new_version),
            pt: node.pt,
            tags,
        };
        self.record(|c| c.modified.push(GeoFeature::Node(updated.clone())));
        Ok(updated)
    }

    /// Like `update_node`, for a way's node list and tags.
    pub async fn update_way(&mut self, way: &Way) -> Result<Way, ApiError> {
        let changeset_id = self.open_id()?;
        let version = way
            .version
            .unwrap_or_else(|| panic!("can't update {} without a version", way.id));
        let doc = xml::way_doc(changeset_id, Some((way.id.0, version)), &way.nodes, &way.tags);
        let body = self.put(&format!("way/{}", way.id.0), doc).await?;
        let new_version = parse_numeric_body(&body)? as i32;
        let mut updated = way.clone();
        updated.version = Some(new_version);
        self.record(|c| c.modified.push(GeoFeature::Way(updated.clone())));
        Ok(updated)
    }

    /// Commits an entrance plan: the entrance node, the building splice, then
    /// (when planned) the access node, the road splice, and the connecting
    /// way, strictly in that order, because each edit references ids the
    /// previous one produced. Consumes the plan; a failed commit leaves the
    /// changeset open, so the caller can build a fresh plan and try again.
    pub async fn commit_plan(&mut self, plan: EntrancePlan) -> Result<Node, ApiError> {
        let mut entrance_tags = plan.entrance_tags.clone();
        if let Some(m) = &plan.building {
            dedup_address(&mut entrance_tags, m.feature.tags());
        }
        let entrance = self.create_node(plan.entrance_point, entrance_tags).await?;

        if let Some(m) = &plan.building {
            if let GeoFeature::Way(way) = &m.feature {
                let mut way = way.clone();
                let at = (m.segment + 1).min(way.nodes.len());
                way.nodes.insert(at, entrance.id);
                way.pts.insert((m.segment + 1).min(way.pts.len()), plan.entrance_point);
                self.update_way(&way).await?;
            }
        }

        if let (Some(m), Some(access_pt), Some(way_tags)) =
            (&plan.road, plan.access_point, plan.way_tags.clone())
        {
            let access = self.create_node(access_pt, Tags::new()).await?;
            if let GeoFeature::Way(way) = &m.feature {
                let mut way = way.clone();
                let at = (m.segment + 1).min(way.nodes.len());
                way.nodes.insert(at, access.id);
                way.pts.insert((m.segment + 1).min(way.pts.len()), access_pt);
                self.update_way(&way).await?;
            }
            self.create_way(vec![access.id, entrance.id], way_tags).await?;
        }

        Ok(entrance)
    }

    /// Downloads a committed changeset's contents for inspection.
    pub async fn download_changeset(&self, id: i64) -> Result<Changeset, ApiError> {
        let url = format!("{}/changeset/{}/download", self.api_url, id);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::Transport(format!(
                "GET {}: HTTP {} {}",
                url, status, text
            )));
        }
        parse_osm_change(id, &text)
    }

    fn open_id(&self) -> Result<i64, ApiError> {
        self.changeset
            .as_ref()
            .map(|c| c.id)
            .ok_or(ApiError::NoChangeset)
    }

    fn record<F: FnOnce(&mut Changeset)>(&mut self, f: F) {
        if let Some(changeset) = &mut self.changeset {
            f(changeset);
        }
    }

    async fn put(&self, path: &str, doc: String) -> Result<String, ApiError> {
        let url = format!("{}/{}", self.api_url, path);
        debug!("PUT {}", url);
        let resp = self
            .client
            .put(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header("Content-Type", "text/xml")
            .body(doc)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        interpret_response(&url, status, text)
    }
}

// Maps the edit API's statuses onto the error taxonomy: 409 is a version
// conflict, everything else non-2xx is transport-level.
fn interpret_response(url: &str, status: u16, body: String) -> Result<String, ApiError> {
    if (200..300).contains(&status) {
        Ok(body)
    } else if status == 409 {
        Err(ApiError::Conflict(body))
    } else {
        Err(ApiError::Transport(format!(
            "{}: HTTP {} {}",
            url, status, body
        )))
    }
}

// Creates answer with the new object's id, updates with the new version;
// either way, a bare number.
fn parse_numeric_body(body: &str) -> Result<i64, ApiError> {
    body.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::Transport(format!("expected a numeric body, got {:?}", body)))
}

// The entrance shouldn't repeat address tags its building already carries.
fn dedup_address(entrance: &mut Tags, building: &Tags) {
    let building_has_address =
        building.contains_key(osm::ADDR_STREET) || building.contains_key(osm::ADDR_HOUSENUMBER);
    if building_has_address
        && entrance.get(osm::ADDR_STREET) == building.get(osm::ADDR_STREET)
        && entrance.get(osm::ADDR_HOUSENUMBER) == building.get(osm::ADDR_HOUSENUMBER)
    {
        entrance.remove(osm::ADDR_STREET);
        entrance.remove(osm::ADDR_HOUSENUMBER);
    }
}

// References to missing objects are just filtered out. Nodes come before the
// ways that use them within each block, so way geometry is resolved from the
// nodes seen so far where possible.
fn parse_osm_change(id: i64, raw: &str) -> Result<Changeset, ApiError> {
    let tree = roxmltree::Document::parse(raw)
        .map_err(|err| ApiError::Transport(format!("bad changeset document: {}", err)))?;

    let mut changeset = Changeset::new(id, "");
    let mut known_nodes: BTreeMap<NodeID, LonLat> = BTreeMap::new();

    for block in tree.root_element().children().filter(|n| n.is_element()) {
        let kind = block.tag_name().name().to_string();
        for obj in block.children().filter(|n| n.is_element()) {
            let feature = match parse_element(obj, &mut known_nodes) {
                Some(f) => f,
                None => continue,
            };
            match kind.as_str() {
                "create" => changeset.created.push(feature),
                "modify" => changeset.modified.push(feature),
                "delete" => changeset.deleted.push(feature),
                other => warn!("unknown osmChange block {:?}", other),
            }
        }
    }
    Ok(changeset)
}

fn parse_element(
    obj: roxmltree::Node,
    known_nodes: &mut BTreeMap<NodeID, LonLat>,
) -> Option<GeoFeature> {
    let id = obj.attribute("id")?.parse::<i64>().ok()?;
    let version = obj.attribute("version").and_then(|v| v.parse::<i32>().ok());
    let tags = read_tags(obj);
    match obj.tag_name().name() {
        "node" => {
            let pt = LonLat::new(
                obj.attribute("lon")?.parse::<f64>().ok()?,
                obj.attribute("lat")?.parse::<f64>().ok()?,
            );
            let id = NodeID(id);
            known_nodes.insert(id, pt);
            Some(GeoFeature::Node(Node {
                id,
                version,
                pt,
                tags,
            }))
        }
        "way" => {
            let mut nodes = Vec::new();
            let mut pts = Vec::new();
            for child in obj.children() {
                if child.tag_name().name() == "nd" {
                    let n = NodeID(child.attribute("ref")?.parse::<i64>().ok()?);
                    nodes.push(n);
                    if let Some(pt) = known_nodes.get(&n) {
                        pts.push(*pt);
                    }
                }
            }
            Some(GeoFeature::Way(Way {
                id: WayID(id),
                version,
                nodes,
                pts,
                tags,
            }))
        }
        _ => None,
    }
}

fn read_tags(obj: roxmltree::Node) -> Tags {
    let mut tags = Tags::new();
    for child in obj.children() {
        if child.tag_name().name() == "tag" {
            if let (Some(k), Some(v)) = (child.attribute("k"), child.attribute("v")) {
                tags.insert(k, v);
            }
        }
    }
    tags
}

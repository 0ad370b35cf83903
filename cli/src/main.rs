//! A multi-tool for the map annotation pipeline: query nearby features, plan
//! an entrance against the closest building and road, and commit the plan to
//! the remote database as a changeset.

#[macro_use]
extern crate log;

use anyhow::{bail, Result};
use structopt::StructOpt;

use geom::{Distance, LonLat};
use osm_api::{entrance_site_filter, Credentials, EditSession, QueryClient, SessionStore};
use osm_model::{
    match_entrance_site, plan_entrance, rank_nearby_features, EntranceKind, EntrancePlan,
};

// How far out to look for a building and a road when siting an entrance
const ENTRANCE_SEARCH_RADIUS: f64 = 10.0;

#[derive(StructOpt)]
#[structopt(name = "mapnote", about = "Spatial feature matching and changeset tools")]
enum Command {
    /// List nearby features, ranked the way the picker shows them
    Nearby {
        #[structopt(long)]
        lat: f64,
        #[structopt(long)]
        lon: f64,
        /// Search radius in meters
        #[structopt(long, default_value = "30")]
        radius: f64,
        /// Overpass endpoint to query
        #[structopt(long, default_value = "https://overpass-api.de/api/interpreter")]
        query_url: String,
    },
    /// Show where an entrance (and its connecting way) would be created,
    /// without committing anything
    PlanEntrance {
        #[structopt(long)]
        lat: f64,
        #[structopt(long)]
        lon: f64,
        /// Plan a delivery entrance instead of a generic one
        #[structopt(long)]
        delivery: bool,
        /// Skip the connecting way to the nearest road
        #[structopt(long)]
        no_way: bool,
        #[structopt(long, default_value = "https://overpass-api.de/api/interpreter")]
        query_url: String,
    },
    /// Open a changeset and store the editing session for later commits
    OpenChangeset {
        #[structopt(long)]
        username: String,
        #[structopt(long)]
        password: String,
        /// Changeset comment
        #[structopt(long)]
        comment: String,
        /// Where to store the session
        #[structopt(long, default_value = "session.json")]
        session: String,
        /// Edit API to open the changeset against
        #[structopt(long, default_value = "https://api.openstreetmap.org/api/0.6")]
        edit_url: String,
    },
    /// Plan and commit an entrance using a stored session
    CommitEntrance {
        #[structopt(long)]
        lat: f64,
        #[structopt(long)]
        lon: f64,
        #[structopt(long)]
        delivery: bool,
        #[structopt(long)]
        no_way: bool,
        #[structopt(long, default_value = "session.json")]
        session: String,
        #[structopt(long, default_value = "https://overpass-api.de/api/interpreter")]
        query_url: String,
    },
    /// Download a committed changeset and summarize its contents
    ShowChangeset {
        #[structopt(long)]
        id: i64,
        #[structopt(long, default_value = "session.json")]
        session: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Command::from_args() {
        Command::Nearby {
            lat,
            lon,
            radius,
            query_url,
        } => nearby(LonLat::new(lon, lat), Distance::meters(radius), &query_url).await,
        Command::PlanEntrance {
            lat,
            lon,
            delivery,
            no_way,
            query_url,
        } => {
            let plan = build_plan(LonLat::new(lon, lat), delivery, no_way, &query_url, None).await?;
            print_plan(&plan);
            Ok(())
        }
        Command::OpenChangeset {
            username,
            password,
            comment,
            session,
            edit_url,
        } => open_changeset(username, password, comment, &session, &edit_url).await,
        Command::CommitEntrance {
            lat,
            lon,
            delivery,
            no_way,
            session,
            query_url,
        } => commit_entrance(LonLat::new(lon, lat), delivery, no_way, &session, &query_url).await,
        Command::ShowChangeset { id, session } => show_changeset(id, &session).await,
    }
}

async fn nearby(center: LonLat, radius: Distance, query_url: &str) -> Result<()> {
    let client = QueryClient::new(query_url);
    let filter = "node[entrance];node[shop];node[place];node[\"addr:housenumber\"];\
                  node[barrier];way[name];";
    let features = client.query(center, radius, filter).await?;
    let ranked = rank_nearby_features(center, &features);
    if ranked.is_empty() {
        println!("Nothing nearby");
    }
    for entry in ranked {
        println!("{}", entry.label);
    }
    Ok(())
}

async fn build_plan(
    point: LonLat,
    delivery: bool,
    no_way: bool,
    query_url: &str,
    session: Option<&mut EditSession>,
) -> Result<EntrancePlan> {
    let client = QueryClient::new(query_url);
    let features = client
        .query(
            point,
            Distance::meters(ENTRANCE_SEARCH_RADIUS),
            &entrance_site_filter(None),
        )
        .await?;
    if let Some(session) = session {
        session.observe(&features);
    }
    let site = match_entrance_site(point, &features);
    let kind = if delivery {
        EntranceKind::Delivery
    } else {
        EntranceKind::Other
    };
    Ok(plan_entrance(point, site, kind, !no_way, None))
}

fn print_plan(plan: &EntrancePlan) {
    println!("Entrance at {}", plan.entrance_point);
    for (k, v) in plan.entrance_tags.iter() {
        println!("  {} = {}", k, v);
    }
    match &plan.building {
        Some(m) => println!("Building: {} ({} away)", m.feature.id(), m.dist),
        None => println!("No building nearby; using the raw point"),
    }
    match (&plan.road, &plan.access_point) {
        (Some(m), Some(access)) => {
            println!("Connecting way to {} at {}", m.feature.id(), access);
            for (k, v) in plan.way_tags.iter().flat_map(|t| t.iter()) {
                println!("  {} = {}", k, v);
            }
        }
        _ => println!("No connecting way planned"),
    }
}

async fn open_changeset(
    username: String,
    password: String,
    comment: String,
    session_path: &str,
    edit_url: &str,
) -> Result<()> {
    let credentials = Credentials { username, password };
    let mut session = EditSession::new(edit_url, credentials.clone());
    let id = session.open_changeset(&comment).await?;
    SessionStore {
        api_url: edit_url.to_string(),
        credentials,
        changeset_id: Some(id),
        comment,
    }
    .save(session_path)?;
    println!("Opened changeset {}; session stored in {}", id, session_path);
    Ok(())
}

async fn commit_entrance(
    point: LonLat,
    delivery: bool,
    no_way: bool,
    session_path: &str,
    query_url: &str,
) -> Result<()> {
    let store = SessionStore::load(session_path)?;
    if store.changeset_id.is_none() {
        bail!("no open changeset in {}; run open-changeset first", session_path);
    }
    let mut session = store.into_session();

    let plan = build_plan(point, delivery, no_way, query_url, Some(&mut session)).await?;
    print_plan(&plan);

    let entrance = session.commit_plan(plan).await?;
    info!("committed entrance as {}", entrance.id);
    println!("Created {}", entrance.id);
    Ok(())
}

async fn show_changeset(id: i64, session_path: &str) -> Result<()> {
    let session = SessionStore::load(session_path)?.into_session();
    let changeset = session.download_changeset(id).await?;
    for (title, features) in [
        ("Created", &changeset.created),
        ("Modified", &changeset.modified),
        ("Deleted", &changeset.deleted),
    ] {
        println!("{} ({}):", title, features.len());
        for f in features {
            match osm_model::feature_label(f.tags()) {
                Some(label) => println!("  {} ({})", label, f.id()),
                None => println!("  {}", f.id()),
            }
        }
    }
    Ok(())
}

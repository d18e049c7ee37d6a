//! Demonstration data for an empty store.

use incidents_core::{
  attachment::Attachment,
  incident::{Incident, IncidentStatus},
  reconcile::SubmittedSlot,
  store::IncidentStore,
};

pub const PUPILS: [&str; 6] = [
  "Tim Golden",
  "Chris Doran",
  "Stephen Davis",
  "Pedro Virgili",
  "Charlie Strinati",
  "Pablo Hinojo",
];

/// Placeholder document attached to the second incident.
const EXAMPLE_PDF: &[u8] = b"%PDF-1.4\n\
  1 0 obj << /Type /Catalog >> endobj\n\
  trailer << /Root 1 0 R >>\n\
  %%EOF\n";

fn slots(names: &[&str]) -> Vec<SubmittedSlot> {
  names
    .iter()
    .enumerate()
    .map(|(i, name)| SubmittedSlot::new(i + 1, *name))
    .collect()
}

/// Populate `store` with the demonstration pupils and incidents. Does nothing
/// and returns `false` if any incident already exists.
pub async fn seed<S: IncidentStore>(store: &S) -> Result<bool, S::Error> {
  if !store.list_incidents().await?.is_empty() {
    tracing::info!("store already holds incidents; not seeding");
    return Ok(false);
  }

  for name in PUPILS {
    store.add_pupil(name.to_owned()).await?;
  }

  let mut first = Incident::new();
  first.one_liner = "An incident occurred".into();
  first.description = "This is the description of the incident".into();
  first.is_racial = true;
  first.other_type = "Blancmange".into();
  let first = store.create_incident(first).await?;
  store
    .update_incident(first, slots(&["Tim Golden", "Stephen Davis"]))
    .await?;

  let mut second = Incident::new();
  second.one_liner = "A second incident occurred".into();
  second.description = "This is the description of the second incident".into();
  second.is_bullying = true;
  second.status = IncidentStatus::Closed;
  let second = store.create_incident(second).await?;
  let second_id = store
    .update_incident(second, slots(&["Chris Doran"]))
    .await?;
  store
    .add_attachment(second_id, Attachment {
      filename: "example.pdf".into(),
      data:     EXAMPLE_PDF.to_vec(),
    })
    .await?;

  tracing::info!(pupils = PUPILS.len(), incidents = 2, "store seeded");
  Ok(true)
}

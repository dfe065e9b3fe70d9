//! Instruction text sent with every generation request.
//!
//! The shared instruction pins everything about the person (face, hair,
//! skin, build, proportions) and allows exactly one change: the outfit.
//! Each [`Scene`] appends its own framing/background directive.
//! All functions here are pure.

use crate::scene::{Scene, SCENE_COUNT};

// ---------------------------------------------------------------------------
// Selected items
// ---------------------------------------------------------------------------

/// A garment or accessory the person should be dressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Top,
    Bottom,
    Accessory,
}

impl Item {
    pub fn phrase(self) -> &'static str {
        match self {
            Item::Top => "this top garment",
            Item::Bottom => "this bottom garment",
            Item::Accessory => "this accessory",
        }
    }
}

/// Which items are present in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemSet {
    pub top: bool,
    pub bottom: bool,
    pub accessory: bool,
}

impl ItemSet {
    /// Present items in canonical order: top, bottom, accessory.
    pub fn items(self) -> Vec<Item> {
        [
            (self.top, Item::Top),
            (self.bottom, Item::Bottom),
            (self.accessory, Item::Accessory),
        ]
        .into_iter()
        .filter_map(|(present, item)| present.then_some(item))
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Clause building
// ---------------------------------------------------------------------------

/// Join phrases as "X", "X and Y", or "X, Y and Z".
pub fn join_phrases(phrases: &[&str]) -> String {
    match phrases {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// Describe the selected items, e.g. "this top garment and this accessory".
///
/// Empty when nothing is selected.
pub fn describe_items(items: ItemSet) -> String {
    let phrases: Vec<&str> = items.items().into_iter().map(Item::phrase).collect();
    join_phrases(&phrases)
}

/// The instruction shared by all four scenes.
pub fn shared_instruction(items: ItemSet) -> String {
    let clothing = describe_items(items);
    format!(
        "Generate a realistic image of the same person shown in the reference model photo.
You must keep every physical trait of the original model absolutely consistent:
- Identical face, including facial shape, nose, eyes, mouth, eyebrows and ears.
- Identical skin tone, respecting its natural nuances.
- Hair with the same shape, style, texture and colour as in the reference image.
- Exactly the same build and body type (slim, sturdy, overweight, very slim, muscular, etc.).
- Height, proportions and physique must stay faithful to the original model, without modification.

The only permitted change is the **outfit** and, where provided, an **accessory**. The model must wear {clothing}.
If a reference accessory is included (for example a bag, hat, necklace or scarf), integrate it realistically and consistently with the outfit.

Do not alter the body, face or proportions of the original model.
Always respect lighting and visual coherence.

The face must remain identical across all 4 images, without modification.

Now apply these rules to the following scene:"
    )
}

/// Combine the shared instruction with one scene's directive.
pub fn scene_instruction(shared: &str, scene: Scene) -> String {
    format!("{shared} {}", scene.directive())
}

/// Build one instruction per scene, index-aligned to [`Scene::ALL`].
pub fn build_instructions(items: ItemSet) -> [String; SCENE_COUNT] {
    let shared = shared_instruction(items);
    Scene::ALL.map(|scene| scene_instruction(&shared, scene))
}

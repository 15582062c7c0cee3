/// Row identifier of a single player card
pub type PlayerID = u32;

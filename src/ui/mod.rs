// ── Presentation ──────────────────────────────────────────────────────────────
//
// Front ends that drive `App`.  None of them own document state.

pub mod console;

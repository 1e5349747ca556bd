//! # Attack Simulations
//!
//! Each module plays an adversary against `PiService` and checks that the
//! attack is rejected without side effects.
//!
//! | Module | Attack |
//! |--------|--------|
//! | `tampering` | Rewriting or forging stored billing blobs |
//! | `signatures` | Forged, stolen or replayed client signatures |
//! | `rfp` | Billing an RFP base proposal |
//! | `concurrency` | Hammering a shared summary cache |

pub mod signatures;

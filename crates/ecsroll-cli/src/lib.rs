//! Build-and-rollout pipeline for ecsroll.
//!
//! ```text
//! ecsroll deploy
//!   1. Build app      ── npm install && npm run build
//!   2. Build image    ── docker build -t <repo>:latest .
//!   3. Registry auth  ── aws ecr get-login-password | docker login
//!   4. Tag & push     ── docker tag / docker push <host>/<repo>:<millis>
//!   5. Fetch          ── aws ecs describe-task-definition → task-def.json
//!      Transform      ── new-task-def.json
//!   6. Register       ── aws ecs register-task-definition
//!   7. Update service ── aws ecs update-service --task-definition <service>:<rev>
//! ```

pub mod pipeline;

pub use pipeline::{DeployOutcome, report};

//! Diesel schema for snapshot reconciliation persistence.

diesel::table! {
    /// Mirrored user accounts addressed by external handle.
    users (id) {
        /// Internal user identifier.
        id -> Uuid,
        /// External chat handle the account is keyed by.
        #[max_length = 255]
        handle -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Projects auto-provisioned from snapshot project names.
    projects (id) {
        /// Internal project identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Display name as seen in the snapshot.
        #[max_length = 255]
        name -> Varchar,
        /// Project lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records mirrored from snapshot sources.
    tasks (id) {
        /// Internal record identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Source service the record mirrors.
        #[max_length = 50]
        source -> Varchar,
        /// Identifier assigned by the source service.
        #[max_length = 255]
        external_id -> Varchar,
        /// Task title.
        title -> Text,
        /// User-managed note, never written by reconciliation.
        note -> Nullable<Text>,
        /// Linked project, when the snapshot names one.
        project_id -> Nullable<Uuid>,
        /// Project display name captured at observation time.
        #[max_length = 255]
        project_name -> Nullable<Varchar>,
        /// Mirror lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Source-side priority.
        priority -> Nullable<Int4>,
        /// Due timestamp.
        due_at -> Nullable<Timestamptz>,
        /// Source-side creation timestamp.
        created_at -> Timestamptz,
        /// First observation timestamp.
        first_seen_at -> Timestamptz,
        /// Most recent observation timestamp.
        last_seen_at -> Timestamptz,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only audit log of task transitions.
    task_events (id) {
        /// Event identifier.
        id -> Uuid,
        /// Insertion sequence breaking timestamp ties on replay.
        seq -> Int8,
        /// Owning user.
        user_id -> Uuid,
        /// Task the event belongs to.
        task_id -> Uuid,
        /// Event kind.
        #[max_length = 50]
        kind -> Varchar,
        /// Event timestamp.
        at -> Timestamptz,
        /// Status before the transition.
        #[max_length = 50]
        from_status -> Nullable<Varchar>,
        /// Status after the transition.
        #[max_length = 50]
        to_status -> Nullable<Varchar>,
        /// Due timestamp captured with the event.
        due_at -> Nullable<Timestamptz>,
        /// Structured event payload.
        meta -> Nullable<Jsonb>,
    }
}

diesel::table! {
    /// Most recent sync pass outcome per user and source.
    sync_states (user_id, source) {
        /// Owning user.
        user_id -> Uuid,
        /// Source the pass ran against.
        #[max_length = 50]
        source -> Varchar,
        /// Whether the pass succeeded.
        ok -> Bool,
        /// Number of snapshot entries observed.
        tasks_count -> Int4,
        /// Failure detail or configuration hint.
        message -> Nullable<Text>,
        /// When the outcome was recorded.
        recorded_at -> Timestamptz,
    }
}

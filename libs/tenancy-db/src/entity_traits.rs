use sea_orm::EntityTrait;

/// Declares which columns of an entity carry tenant ownership.
///
/// Both columns must be stated explicitly; `None` means the entity has no
/// such index and queries fall back to the next, less specific shape.
///
/// ```rust,ignore
/// impl ScopableEntity for deposit::Entity {
///     fn organization_col() -> Option<Self::Column> {
///         Some(deposit::Column::OrganizationId)
///     }
///     fn establishment_col() -> Option<Self::Column> {
///         Some(deposit::Column::EstablishmentId)
///     }
/// }
/// ```
pub trait ScopableEntity: EntityTrait {
    /// Column holding the owning organization id.
    fn organization_col() -> Option<Self::Column>;

    /// Column holding the owning establishment id.
    fn establishment_col() -> Option<Self::Column>;
}

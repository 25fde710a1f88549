use super::{
    models, schema, DiaryStore, DiaryStoreFacade, EventId, MediaItemId, RoleId, RotaEntryId,
    ShowingFilter, ShowingId, StoreError, TagId, TemplateId,
};
use chrono::naive::NaiveDate;
use diesel::expression::AsExpression;
use diesel::pg::PgConnection;
use diesel::prelude::*;

#[derive(Clone)]
pub struct PgDataStore {
    pool: diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStore {
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        let connection_manager = diesel::r2d2::ConnectionManager::<PgConnection>::new(database_url);
        Ok(Self {
            pool: diesel::r2d2::Pool::builder()
                .test_on_check_out(true)
                .min_idle(Some(2))
                .build(connection_manager)?,
        })
    }
}

impl DiaryStore for PgDataStore {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn DiaryStoreFacade + 'a>, StoreError> {
        Ok(Box::new(PgDataStoreFacade::with_pooled_connection(
            self.pool.get()?,
        )))
    }
}

pub struct PgDataStoreFacade {
    connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStoreFacade {
    pub fn with_pooled_connection(
        connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
    ) -> Self {
        Self { connection }
    }
}

impl DiaryStoreFacade for PgDataStoreFacade {
    fn get_event(&mut self, the_event_id: EventId) -> Result<models::FullEvent, StoreError> {
        use schema::events::dsl::*;

        self.connection.transaction(|connection| {
            let event = events
                .filter(id.eq(the_event_id))
                .select(models::Event::as_select())
                .first::<models::Event>(connection)?;

            let tag_ids = models::EventTagMapping::belonging_to(&event)
                .select(models::EventTagMapping::as_select())
                .load::<models::EventTagMapping>(connection)?
                .into_iter()
                .map(|mapping| mapping.tag_id)
                .collect();

            let media_ids = models::EventMediaMapping::belonging_to(&event)
                .select(models::EventMediaMapping::as_select())
                .load::<models::EventMediaMapping>(connection)?
                .into_iter()
                .map(|mapping| mapping.media_item_id)
                .collect();

            Ok(models::FullEvent {
                event,
                tag_ids,
                media_ids,
            })
        })
    }

    fn update_event(
        &mut self,
        the_event_id: EventId,
        event: models::FullNewEvent,
    ) -> Result<(), StoreError> {
        use schema::events::dsl::*;

        self.connection.transaction(|connection| {
            let count = diesel::update(events)
                .filter(id.eq(the_event_id))
                .set(&event.event)
                .execute(connection)?;
            if count == 0 {
                return Err(StoreError::NotExisting);
            }

            update_event_tags(the_event_id, &event.tag_ids, connection)?;
            update_event_media(the_event_id, &event.media_ids, connection)?;
            Ok(())
        })
    }

    fn create_event_with_showings(
        &mut self,
        event: models::FullNewEvent,
        showings: Vec<models::NewShowing>,
        rota_role_ids: Vec<RoleId>,
    ) -> Result<EventId, StoreError> {
        self.connection.transaction(|connection| {
            let the_event_id = diesel::insert_into(schema::events::table)
                .values(&event.event)
                .returning(schema::events::id)
                .get_result::<EventId>(connection)?;

            update_event_tags(the_event_id, &event.tag_ids, connection)?;
            update_event_media(the_event_id, &event.media_ids, connection)?;

            let rota_seed: Vec<models::NewRotaEntry> = rota_role_ids
                .iter()
                .map(|role_id| models::NewRotaEntry {
                    role_id: *role_id,
                    rank: 1,
                    required: true,
                })
                .collect();
            for mut showing in showings {
                showing.event_id = the_event_id;
                insert_showing_with_rota(&showing, &rota_seed, connection)?;
            }

            Ok(the_event_id)
        })
    }

    fn get_showings_filtered(
        &mut self,
        filter: ShowingFilter,
    ) -> Result<Vec<models::FullShowing>, StoreError> {
        use schema::showings::dsl::*;

        self.connection.transaction(|connection| {
            let showings_with_events = showings
                .inner_join(schema::events::table)
                .filter(showing_filter_to_sql(filter))
                .order_by((start.asc(), id.asc()))
                .select((models::Showing::as_select(), models::Event::as_select()))
                .load::<(models::Showing, models::Event)>(connection)?;

            let (the_showings, the_events): (Vec<models::Showing>, Vec<models::Event>) =
                showings_with_events.into_iter().unzip();

            let the_rota_entries = models::RotaEntry::belonging_to(&the_showings)
                .order_by((
                    schema::rota_entries::role_id,
                    schema::rota_entries::rank,
                ))
                .select(models::RotaEntry::as_select())
                .load::<models::RotaEntry>(connection)?
                .grouped_by(&the_showings);

            Ok(the_showings
                .into_iter()
                .zip(the_events)
                .zip(the_rota_entries)
                .map(|((showing, event), rota)| models::FullShowing {
                    showing,
                    event,
                    rota,
                })
                .collect())
        })
    }

    fn get_showing(&mut self, showing_id: ShowingId) -> Result<models::FullShowing, StoreError> {
        use schema::showings::dsl::*;

        self.connection.transaction(|connection| {
            let (showing, event) = showings
                .inner_join(schema::events::table)
                .filter(id.eq(showing_id))
                .select((models::Showing::as_select(), models::Event::as_select()))
                .first::<(models::Showing, models::Event)>(connection)?;

            let rota = schema::rota_entries::table
                .filter(schema::rota_entries::showing_id.eq(showing.id))
                .order_by((
                    schema::rota_entries::role_id,
                    schema::rota_entries::rank,
                ))
                .select(models::RotaEntry::as_select())
                .load::<models::RotaEntry>(connection)?;

            Ok(models::FullShowing {
                showing,
                event,
                rota,
            })
        })
    }

    fn create_showing_with_rota(
        &mut self,
        showing: models::NewShowing,
        rota: Vec<models::NewRotaEntry>,
    ) -> Result<ShowingId, StoreError> {
        self.connection
            .transaction(|connection| insert_showing_with_rota(&showing, &rota, connection))
    }

    fn update_showing_and_rota(
        &mut self,
        showing_id: ShowingId,
        showing: models::ShowingUpdate,
        new_rota_entries: Vec<models::NewRotaEntry>,
        deleted_rota_entries: Vec<RotaEntryId>,
    ) -> Result<(), StoreError> {
        use schema::showings::dsl::*;

        self.connection.transaction(|connection| {
            let count = diesel::update(showings)
                .filter(id.eq(showing_id))
                .set(&showing)
                .execute(connection)?;
            if count == 0 {
                return Err(StoreError::NotExisting);
            }

            diesel::delete(
                schema::rota_entries::table
                    .filter(schema::rota_entries::showing_id.eq(showing_id))
                    .filter(schema::rota_entries::id.eq_any(deleted_rota_entries)),
            )
            .execute(connection)?;

            insert_rota_entries(showing_id, &new_rota_entries, connection)?;
            Ok(())
        })
    }

    fn delete_showing(&mut self, showing_id: ShowingId) -> Result<(), StoreError> {
        use schema::showings::dsl::*;

        self.connection.transaction(|connection| {
            diesel::delete(
                schema::rota_entries::table
                    .filter(schema::rota_entries::showing_id.eq(showing_id)),
            )
            .execute(connection)?;

            let count = diesel::delete(showings)
                .filter(id.eq(showing_id))
                .execute(connection)?;
            if count == 0 {
                return Err(StoreError::NotExisting);
            }
            Ok(())
        })
    }

    fn get_roles(&mut self) -> Result<Vec<models::Role>, StoreError> {
        use schema::roles::dsl::*;

        Ok(roles
            .select(models::Role::as_select())
            .order_by(name)
            .load::<models::Role>(&mut self.connection)?)
    }

    fn create_role(&mut self, the_name: &str) -> Result<RoleId, StoreError> {
        use schema::roles::dsl::*;

        Ok(diesel::insert_into(roles)
            .values((name.eq(the_name), read_only.eq(false), standard.eq(false)))
            .returning(id)
            .get_result::<RoleId>(&mut self.connection)?)
    }

    fn rename_role(&mut self, role_id: RoleId, the_name: &str) -> Result<(), StoreError> {
        use schema::roles::dsl::*;

        let count = diesel::update(roles)
            .filter(id.eq(role_id))
            .set(name.eq(the_name))
            .execute(&mut self.connection)?;
        if count == 0 {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }

    fn delete_role(&mut self, role_id: RoleId) -> Result<(), StoreError> {
        use schema::roles::dsl::*;

        let count = diesel::delete(roles)
            .filter(id.eq(role_id))
            .execute(&mut self.connection)?;
        if count == 0 {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }

    fn get_event_tags(&mut self) -> Result<Vec<models::EventTag>, StoreError> {
        use schema::event_tags::dsl::*;

        Ok(event_tags
            .select(models::EventTag::as_select())
            .order_by(name)
            .load::<models::EventTag>(&mut self.connection)?)
    }

    fn create_event_tag(&mut self, the_name: &str, the_slug: &str) -> Result<TagId, StoreError> {
        use schema::event_tags::dsl::*;

        Ok(diesel::insert_into(event_tags)
            .values((name.eq(the_name), slug.eq(the_slug), read_only.eq(false)))
            .returning(id)
            .get_result::<TagId>(&mut self.connection)?)
    }

    fn rename_event_tag(
        &mut self,
        tag_id: TagId,
        the_name: &str,
        the_slug: &str,
    ) -> Result<(), StoreError> {
        use schema::event_tags::dsl::*;

        let count = diesel::update(event_tags)
            .filter(id.eq(tag_id))
            .set((name.eq(the_name), slug.eq(the_slug)))
            .execute(&mut self.connection)?;
        if count == 0 {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }

    fn delete_event_tag(&mut self, tag_id: TagId) -> Result<(), StoreError> {
        self.connection.transaction(|connection| {
            diesel::delete(
                schema::event_tag_mappings::table
                    .filter(schema::event_tag_mappings::tag_id.eq(tag_id)),
            )
            .execute(connection)?;

            let count = diesel::delete(
                schema::event_tags::table.filter(schema::event_tags::id.eq(tag_id)),
            )
            .execute(connection)?;
            if count == 0 {
                return Err(StoreError::NotExisting);
            }
            Ok(())
        })
    }

    fn get_templates(&mut self) -> Result<Vec<models::FullEventTemplate>, StoreError> {
        use schema::event_templates::dsl::*;

        self.connection.transaction(|connection| {
            let the_templates = event_templates
                .order_by(name)
                .select(models::EventTemplate::as_select())
                .load::<models::EventTemplate>(connection)?;

            let the_template_roles = models::TemplateRoleMapping::belonging_to(&the_templates)
                .select(models::TemplateRoleMapping::as_select())
                .load::<models::TemplateRoleMapping>(connection)?
                .grouped_by(&the_templates);

            let the_template_tags = models::TemplateTagMapping::belonging_to(&the_templates)
                .select(models::TemplateTagMapping::as_select())
                .load::<models::TemplateTagMapping>(connection)?
                .grouped_by(&the_templates);

            Ok(the_templates
                .into_iter()
                .zip(the_template_roles)
                .zip(the_template_tags)
                .map(|((template, template_roles), template_tags)| {
                    models::FullEventTemplate {
                        template,
                        role_ids: template_roles.into_iter().map(|m| m.role_id).collect(),
                        tag_ids: template_tags.into_iter().map(|m| m.tag_id).collect(),
                    }
                })
                .collect())
        })
    }

    fn get_template(
        &mut self,
        the_template_id: TemplateId,
    ) -> Result<models::FullEventTemplate, StoreError> {
        use schema::event_templates::dsl::*;

        self.connection.transaction(|connection| {
            let template = event_templates
                .filter(id.eq(the_template_id))
                .select(models::EventTemplate::as_select())
                .first::<models::EventTemplate>(connection)?;

            let role_ids = schema::template_roles::table
                .filter(schema::template_roles::template_id.eq(template.id))
                .select(schema::template_roles::role_id)
                .load::<RoleId>(connection)?;

            let tag_ids = schema::template_tags::table
                .filter(schema::template_tags::template_id.eq(template.id))
                .select(schema::template_tags::tag_id)
                .load::<TagId>(connection)?;

            Ok(models::FullEventTemplate {
                template,
                role_ids,
                tag_ids,
            })
        })
    }

    fn update_template(
        &mut self,
        the_template_id: TemplateId,
        the_name: &str,
        role_ids: Vec<RoleId>,
        tag_ids: Vec<TagId>,
    ) -> Result<(), StoreError> {
        use schema::event_templates::dsl::*;

        self.connection.transaction(|connection| {
            let count = diesel::update(event_templates)
                .filter(id.eq(the_template_id))
                .set(name.eq(the_name))
                .execute(connection)?;
            if count == 0 {
                return Err(StoreError::NotExisting);
            }

            diesel::delete(
                schema::template_roles::table
                    .filter(schema::template_roles::template_id.eq(the_template_id)),
            )
            .execute(connection)?;
            diesel::insert_into(schema::template_roles::table)
                .values(
                    role_ids
                        .iter()
                        .map(|the_role_id| {
                            (
                                schema::template_roles::template_id.eq(the_template_id),
                                schema::template_roles::role_id.eq(the_role_id),
                            )
                        })
                        .collect::<Vec<_>>(),
                )
                .execute(connection)?;

            diesel::delete(
                schema::template_tags::table
                    .filter(schema::template_tags::template_id.eq(the_template_id)),
            )
            .execute(connection)?;
            diesel::insert_into(schema::template_tags::table)
                .values(
                    tag_ids
                        .iter()
                        .map(|the_tag_id| {
                            (
                                schema::template_tags::template_id.eq(the_template_id),
                                schema::template_tags::tag_id.eq(the_tag_id),
                            )
                        })
                        .collect::<Vec<_>>(),
                )
                .execute(connection)?;

            Ok(())
        })
    }

    fn get_idea(&mut self, the_month: NaiveDate) -> Result<Option<models::DiaryIdea>, StoreError> {
        use schema::diary_ideas::dsl::*;

        Ok(diary_ideas
            .filter(month.eq(the_month))
            .select(models::DiaryIdea::as_select())
            .first::<models::DiaryIdea>(&mut self.connection)
            .optional()?)
    }

    fn get_ideas_between(
        &mut self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<models::DiaryIdea>, StoreError> {
        use schema::diary_ideas::dsl::*;

        Ok(diary_ideas
            .filter(month.ge(from))
            .filter(month.lt(to))
            .order_by(month)
            .select(models::DiaryIdea::as_select())
            .load::<models::DiaryIdea>(&mut self.connection)?)
    }

    fn upsert_idea(&mut self, the_month: NaiveDate, the_ideas: &str) -> Result<(), StoreError> {
        use schema::diary_ideas::dsl::*;

        diesel::insert_into(diary_ideas)
            .values((month.eq(the_month), ideas.eq(the_ideas)))
            .on_conflict(month)
            .do_update()
            .set(ideas.eq(the_ideas))
            .execute(&mut self.connection)?;
        Ok(())
    }

    fn get_media_item(&mut self, media_item_id: MediaItemId) -> Result<models::MediaItem, StoreError> {
        use schema::media_items::dsl::*;

        Ok(media_items
            .filter(id.eq(media_item_id))
            .select(models::MediaItem::as_select())
            .first::<models::MediaItem>(&mut self.connection)?)
    }
}

fn insert_showing_with_rota(
    showing: &models::NewShowing,
    rota: &[models::NewRotaEntry],
    connection: &mut PgConnection,
) -> Result<ShowingId, StoreError> {
    let the_showing_id = diesel::insert_into(schema::showings::table)
        .values(showing)
        .returning(schema::showings::id)
        .get_result::<ShowingId>(connection)?;

    insert_rota_entries(the_showing_id, rota, connection)?;
    Ok(the_showing_id)
}

fn insert_rota_entries(
    the_showing_id: ShowingId,
    rota: &[models::NewRotaEntry],
    connection: &mut PgConnection,
) -> Result<(), diesel::result::Error> {
    use schema::rota_entries::dsl::*;

    diesel::insert_into(rota_entries)
        .values(
            rota.iter()
                .map(|entry| {
                    (
                        showing_id.eq(the_showing_id),
                        role_id.eq(entry.role_id),
                        rank.eq(entry.rank),
                        required.eq(entry.required),
                    )
                })
                .collect::<Vec<_>>(),
        )
        .execute(connection)
        .map(|_| ())
}

fn update_event_tags(
    the_event_id: EventId,
    tag_ids: &[TagId],
    connection: &mut PgConnection,
) -> Result<(), diesel::result::Error> {
    use schema::event_tag_mappings::dsl::*;

    diesel::delete(event_tag_mappings.filter(event_id.eq(the_event_id))).execute(connection)?;

    diesel::insert_into(event_tag_mappings)
        .values(
            tag_ids
                .iter()
                .map(|the_tag_id| (event_id.eq(the_event_id), tag_id.eq(the_tag_id)))
                .collect::<Vec<_>>(),
        )
        .execute(connection)
        .map(|_| ())
}

fn update_event_media(
    the_event_id: EventId,
    media_ids: &[MediaItemId],
    connection: &mut PgConnection,
) -> Result<(), diesel::result::Error> {
    use schema::event_media::dsl::*;

    diesel::delete(event_media.filter(event_id.eq(the_event_id))).execute(connection)?;

    diesel::insert_into(event_media)
        .values(
            media_ids
                .iter()
                .map(|the_media_id| {
                    (
                        event_id.eq(the_event_id),
                        media_item_id.eq(the_media_id),
                    )
                })
                .collect::<Vec<_>>(),
        )
        .execute(connection)
        .map(|_| ())
}

type BoxedBoolExpression<'a, Source> =
    Box<dyn BoxableExpression<Source, diesel::pg::Pg, SqlType = diesel::sql_types::Bool> + 'a>;

type ShowingsWithEvents =
    diesel::dsl::InnerJoinQuerySource<schema::showings::table, schema::events::table>;

fn showing_filter_to_sql<'a>(filter: ShowingFilter) -> BoxedBoolExpression<'a, ShowingsWithEvents> {
    use diesel::dsl::not;

    let mut expression: BoxedBoolExpression<'a, ShowingsWithEvents> =
        Box::new(diesel::dsl::sql::<diesel::sql_types::Bool>("TRUE"));
    if let Some(start_after) = filter.start_after {
        expression = Box::new(
            expression
                .as_expression()
                .and(schema::showings::start.ge(start_after)),
        );
    }
    if let Some(start_before) = filter.start_before {
        expression = Box::new(
            expression
                .as_expression()
                .and(schema::showings::start.lt(start_before)),
        );
    }
    if filter.confirmed_only {
        expression = Box::new(expression.as_expression().and(schema::showings::confirmed));
    }
    if filter.exclude_cancelled {
        expression = Box::new(
            expression
                .as_expression()
                .and(not(schema::showings::cancelled))
                .and(not(schema::events::cancelled)),
        );
    }
    if filter.public_only {
        expression = Box::new(
            expression
                .as_expression()
                .and(not(schema::events::private))
                .and(not(schema::showings::hide_in_programme)),
        );
    }
    expression
}

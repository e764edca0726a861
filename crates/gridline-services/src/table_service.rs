//! Table rendering service
//!
//! Orchestrates one table request: descriptor resolution and validation,
//! type detection, parameter normalization, search, sort, pagination and
//! markup rendering.

use serde_json::json;
use std::sync::Arc;

use gridline_core::{DataSource, Renderer, Row, SortDirection, TableQuery};

use crate::aggregate::aggregate;
use crate::column::Column;
use crate::config::{Aggregation, TableDefaults};
use crate::descriptor::{DataTable, TableDescriptor};
use crate::error::{ServiceError, ServiceResult};
use crate::formatting::format_value;
use crate::pagination::{PaginationMeta, PaginationResult, Paginator, PaginatorFactory};
use crate::params::{RawParams, RequestParams};
use crate::type_cache::{TypeCache, detect_types};
use crate::view_models::{CellView, ColumnView, LinkView, RowView, SortIcons, TableResponse};

/// Service rendering [`DataTable`]s
///
/// Handles:
/// - Descriptor validation and type enrichment (cached per checksum)
/// - Search and sort applied to the base query
/// - Pagination through the configured strategy
/// - Row, pagination and sort icon markup
pub struct TableService {
    source: Arc<dyn DataSource>,
    types: Arc<TypeCache>,
    renderer: Arc<dyn Renderer>,
    defaults: TableDefaults,
    paginators: PaginatorFactory,
}

impl TableService {
    pub fn new(
        source: Arc<dyn DataSource>,
        types: Arc<TypeCache>,
        renderer: Arc<dyn Renderer>,
        defaults: TableDefaults,
    ) -> Self {
        let paginators = PaginatorFactory::new(Paginator::new(defaults.page_range));
        Self {
            source,
            types,
            renderer,
            defaults,
            paginators,
        }
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    pub fn defaults(&self) -> &TableDefaults {
        &self.defaults
    }

    /// Build and validate the descriptor of `table`, enriched with the
    /// cached column types.
    ///
    /// Validation runs before any query is issued.
    #[tracing::instrument(skip(self, table), fields(table = %table.name()))]
    pub async fn prepare(&self, table: &dyn DataTable) -> ServiceResult<TableDescriptor> {
        let mut descriptor = TableDescriptor::build(table, &self.defaults)?;
        descriptor.validate()?;

        let checksum = descriptor.checksum()?;
        let types = self
            .types
            .get_or_build(&checksum, || detect_types(self.source.as_ref(), &descriptor))
            .await?;
        descriptor.apply_types(&types);

        Ok(descriptor)
    }

    /// Base query with search and sort applied, without pagination
    pub fn filtered_query(
        &self,
        table: &dyn DataTable,
        descriptor: &TableDescriptor,
        params: &RequestParams,
    ) -> ServiceResult<TableQuery> {
        let options = descriptor.options();
        let mut query = descriptor.base_query().clone();

        if let Some(text) = params.search.as_deref().filter(|_| options.searchable) {
            query = table.apply_search(query, text, descriptor);
        }

        if let Some(field) = params.sort.as_deref().filter(|_| options.sortable) {
            let column = descriptor
                .column(field)
                .filter(|column| column.sortable)
                .ok_or_else(|| ServiceError::InvalidSortField {
                    field: field.to_string(),
                })?;
            query = query.without_order().order_by(column.source_path(), params.order);
        }

        Ok(query)
    }

    /// Descriptor and filtered, unpaginated query for exporting `table`.
    ///
    /// The query always ends with the row key ordering so exporters reading
    /// it in OFFSET/LIMIT batches see every row exactly once.
    pub async fn export_query(
        &self,
        table: &dyn DataTable,
        raw: &RawParams,
    ) -> ServiceResult<(TableDescriptor, TableQuery)> {
        let descriptor = self.prepare(table).await?;
        let params = RequestParams::normalize(raw, &descriptor);
        let mut query = self.filtered_query(table, &descriptor, &params)?;

        if let Some(key) = descriptor.row_key().map(Column::source_path) {
            if !query.ordering().iter().any(|order| order.path == key) {
                query = query.order_by(key, SortDirection::Asc);
            }
        }
        Ok((descriptor, query))
    }

    /// Render one page of `table`
    #[tracing::instrument(skip(self, table, raw), fields(table = %table.name()))]
    pub async fn render(&self, table: &dyn DataTable, raw: &RawParams) -> ServiceResult<TableResponse> {
        let descriptor = self.prepare(table).await?;
        let params = RequestParams::normalize(raw, &descriptor);
        let query = self.filtered_query(table, &descriptor, &params)?;

        let strategy = self.paginators.resolve(&descriptor.options().pagination);
        let page = strategy
            .paginate(self.source.as_ref(), &query, params.page, params.limit)
            .await?;
        let meta = PaginationMeta::from(&page);

        let templates = &self.defaults.templates;
        let rows = self
            .renderer
            .render(&templates.rows, &self.rows_context(&descriptor, &params, &page))?;
        let pagination = self.renderer.render(
            &templates.pagination,
            &json!({
                "table": descriptor.name(),
                "pagination": &meta,
                "params": &params,
            }),
        )?;
        let icons = self.render_icons(&descriptor)?;

        tracing::info!(
            strategy = strategy.name(),
            page = meta.page,
            total = meta.total,
            rows = page.items.len(),
            "rendered table"
        );

        Ok(TableResponse {
            rows,
            pagination,
            icons,
            meta,
            params,
        })
    }

    fn render_icons(&self, descriptor: &TableDescriptor) -> ServiceResult<SortIcons> {
        let templates = &self.defaults.templates;
        let context = json!({ "table": descriptor.name() });
        Ok(SortIcons {
            icon_sort_asc: self.renderer.render(&templates.icon_sort_asc, &context)?,
            icon_sort_desc: self.renderer.render(&templates.icon_sort_desc, &context)?,
            icon_sort_neutral: self.renderer.render(&templates.icon_sort_neutral, &context)?,
        })
    }

    fn rows_context(
        &self,
        descriptor: &TableDescriptor,
        params: &RequestParams,
        page: &PaginationResult,
    ) -> serde_json::Value {
        let options = descriptor.options();
        let colspan = descriptor.columns().len()
            + usize::from(options.selector.is_some())
            + usize::from(options.action.is_some());

        json!({
            "table": descriptor.name(),
            "translation_domain": &options.translation_domain,
            "columns": column_views(descriptor, params),
            "rows": row_views(descriptor, &page.items),
            "footer": footer_cells(descriptor, &page.items),
            "action": &options.action,
            "selector": &options.selector,
            "colspan": colspan,
            "empty_message": &self.defaults.empty_message,
            "params": params,
        })
    }
}

fn column_views(descriptor: &TableDescriptor, params: &RequestParams) -> Vec<ColumnView> {
    descriptor
        .columns()
        .iter()
        .map(|column| ColumnView {
            name: column.name.clone(),
            alias: column.output_alias.clone(),
            label: column.label.clone(),
            sortable: column.sortable && descriptor.options().sortable,
            sorted: params
                .sort
                .as_deref()
                .filter(|field| column.matches(field))
                .map(|_| params.order.as_str()),
            translate: column.header.translate,
            class: column.header.class.clone(),
            attributes: column.header.attributes.clone(),
            datatype: column.datatype.clone(),
        })
        .collect()
}

fn row_views(descriptor: &TableDescriptor, rows: &[Row]) -> Vec<RowView> {
    let options = descriptor.options();

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let cells = descriptor
                .columns()
                .iter()
                .map(|column| CellView {
                    value: Some(column.value_in(row).map(format_value).unwrap_or_default()),
                    translate: column.body.translate || column.is_translatable_enum,
                    class: column.body.class.clone(),
                    attributes: column.body.attributes.clone(),
                })
                .collect();

            let key = options
                .selector
                .as_ref()
                .and_then(|selector| row.get_by_name(&selector.field))
                .map(format_value)
                .unwrap_or_else(|| index.to_string());

            let actions = options
                .action
                .as_ref()
                .map(|action| {
                    action
                        .links
                        .iter()
                        .map(|link| LinkView {
                            label: link.label.clone(),
                            href: expand_placeholders(&link.href, row),
                            class: link.class.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            RowView { key, cells, actions }
        })
        .collect()
}

/// Footer cells, or `None` when no column aggregates
fn footer_cells(descriptor: &TableDescriptor, rows: &[Row]) -> Option<Vec<CellView>> {
    let columns = descriptor.columns();
    if columns.iter().all(|column| column.aggregate == Aggregation::None) {
        return None;
    }

    Some(
        columns
            .iter()
            .map(|column| CellView {
                value: aggregate(
                    column.aggregate,
                    rows.iter().filter_map(|row| column.value_in(row)),
                )
                .map(|value| format_value(&value)),
                translate: column.footer.translate,
                class: column.footer.class.clone(),
                attributes: column.footer.attributes.clone(),
            })
            .collect(),
    )
}

/// Replace `{field}` placeholders with the row's formatted values
fn expand_placeholders(template: &str, row: &Row) -> String {
    row.columns()
        .iter()
        .zip(&row.values)
        .fold(template.to_string(), |href, (name, value)| {
            href.replace(&format!("{{{}}}", name), &format_value(value))
        })
}

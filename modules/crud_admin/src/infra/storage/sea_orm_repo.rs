use anyhow::Context;
use async_trait::async_trait;
use sea_orm::sea_query::{Alias, ColumnDef, Expr, Order, Query, SelectStatement, SimpleExpr, Table};
use sea_orm::sqlx::error::ErrorKind;
use sea_orm::{ConnectionTrait, DbErr, QueryResult, RuntimeErr};

use crate::contract::model::{FieldValue, Record, RecordId, StoredRecord};
use crate::domain::repo::{RecordStore, StoreError};
use crate::domain::shape::{FieldKind, ShapeDescriptor, ID_COLUMN};

/// SeaORM-backed store. Statements are built per shape with `sea_query`, so one
/// implementation serves every entity kind on SQLite and PostgreSQL.
pub struct SeaOrmRecordStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRecordStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    fn select_all(shape: &ShapeDescriptor) -> SelectStatement {
        let mut q = Query::select();
        q.column(Alias::new(ID_COLUMN))
            .columns(shape.fields.iter().map(|f| Alias::new(f.name.as_str())))
            .from(Alias::new(shape.table.as_str()));
        q
    }
}

fn field_expr(value: &FieldValue) -> SimpleExpr {
    match value {
        FieldValue::Text(s) => SimpleExpr::Value(s.clone().into()),
        FieldValue::Date(d) => SimpleExpr::Value((*d).into()),
        FieldValue::Boolean(b) => SimpleExpr::Value((*b).into()),
    }
}

fn row_to_record(row: &QueryResult, shape: &ShapeDescriptor) -> Result<StoredRecord, DbErr> {
    let id: RecordId = row.try_get("", ID_COLUMN)?;
    let mut values = Record::new();
    for field in &shape.fields {
        let name = field.name.as_str();
        let value = match field.kind {
            FieldKind::Text => row.try_get::<Option<String>>("", name)?.map(FieldValue::Text),
            FieldKind::Date => row
                .try_get::<Option<chrono::NaiveDate>>("", name)?
                .map(FieldValue::Date),
            FieldKind::Boolean => row.try_get::<Option<bool>>("", name)?.map(FieldValue::Boolean),
        };
        if let Some(v) = value {
            values.insert(field.name.clone(), v);
        }
    }
    Ok(StoredRecord { id, values })
}

/// Integrity violations reported by the driver become `Constraint`; the
/// engine text is kept for logging only.
fn classify_insert_error(err: DbErr) -> StoreError {
    let kind = match &err {
        DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db)))
        | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db))) => Some(db.kind()),
        _ => None,
    };
    match kind {
        Some(
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation,
        ) => StoreError::Constraint(err.to_string()),
        _ => StoreError::Backend(anyhow::Error::new(err).context("insert failed")),
    }
}

#[async_trait]
impl<C> RecordStore for SeaOrmRecordStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn init_schema(&self, shapes: &[ShapeDescriptor]) -> anyhow::Result<()> {
        let backend = self.conn.get_database_backend();
        for shape in shapes {
            let mut stmt = Table::create();
            stmt.table(Alias::new(shape.table.as_str()))
                .if_not_exists()
                .col(
                    ColumnDef::new(Alias::new(ID_COLUMN))
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                );

            for field in &shape.fields {
                let mut col = ColumnDef::new(Alias::new(field.name.as_str()));
                match field.kind {
                    FieldKind::Text => col.text(),
                    FieldKind::Date => col.date(),
                    FieldKind::Boolean => col.boolean(),
                };
                if field.required {
                    col.not_null();
                } else {
                    col.null();
                }
                stmt.col(&mut col);
            }

            self.conn
                .execute(backend.build(&stmt))
                .await
                .with_context(|| format!("create table '{}'", shape.table))?;
            tracing::debug!(table = %shape.table, "table ensured");
        }
        Ok(())
    }

    async fn create(
        &self,
        shape: &ShapeDescriptor,
        record: &Record,
    ) -> Result<StoredRecord, StoreError> {
        let backend = self.conn.get_database_backend();

        let (columns, values): (Vec<_>, Vec<_>) = shape
            .fields
            .iter()
            .filter_map(|f| {
                record
                    .get(&f.name)
                    .map(|v| (Alias::new(f.name.as_str()), field_expr(v)))
            })
            .unzip();

        let mut insert = Query::insert();
        insert.into_table(Alias::new(shape.table.as_str()));
        if columns.is_empty() {
            insert.or_default_values();
        } else {
            insert.columns(columns);
            insert
                .values(values)
                .map_err(|e| anyhow::anyhow!("cannot build insert for '{}': {e}", shape.table))?;
        }
        insert.returning_col(Alias::new(ID_COLUMN));

        let row = self
            .conn
            .query_one(backend.build(&insert))
            .await
            .map_err(classify_insert_error)?
            .ok_or_else(|| anyhow::anyhow!("insert into '{}' returned no id", shape.table))?;
        let id: RecordId = row
            .try_get("", ID_COLUMN)
            .context("read inserted id")?;

        // Values are echoed from the validated record; nothing else is generated by the store.
        let values = shape
            .fields
            .iter()
            .filter_map(|f| record.get(&f.name).map(|v| (f.name.clone(), v.clone())))
            .collect();
        Ok(StoredRecord { id, values })
    }

    async fn get_all(&self, shape: &ShapeDescriptor) -> anyhow::Result<Vec<StoredRecord>> {
        let backend = self.conn.get_database_backend();
        let mut q = Self::select_all(shape);
        q.order_by(Alias::new(ID_COLUMN), Order::Asc);

        let rows = self
            .conn
            .query_all(backend.build(&q))
            .await
            .with_context(|| format!("select from '{}'", shape.table))?;
        rows.iter()
            .map(|row| row_to_record(row, shape))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("decode rows of '{}'", shape.table))
    }

    async fn get_by_id(
        &self,
        shape: &ShapeDescriptor,
        id: RecordId,
    ) -> anyhow::Result<Option<StoredRecord>> {
        let backend = self.conn.get_database_backend();
        let mut q = Self::select_all(shape);
        q.and_where(Expr::col(Alias::new(ID_COLUMN)).eq(id));

        let row = self
            .conn
            .query_one(backend.build(&q))
            .await
            .with_context(|| format!("select {} from '{}'", id, shape.table))?;
        row.map(|r| row_to_record(&r, shape))
            .transpose()
            .with_context(|| format!("decode row {} of '{}'", id, shape.table))
    }

    async fn delete(&self, shape: &ShapeDescriptor, id: RecordId) -> anyhow::Result<bool> {
        let backend = self.conn.get_database_backend();
        let mut del = Query::delete();
        del.from_table(Alias::new(shape.table.as_str()))
            .and_where(Expr::col(Alias::new(ID_COLUMN)).eq(id));

        let res = self
            .conn
            .execute(backend.build(&del))
            .await
            .with_context(|| format!("delete {} from '{}'", id, shape.table))?;
        Ok(res.rows_affected() > 0)
    }
}

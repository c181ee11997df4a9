//! Financial transactions migration.
//!
//! Creates the id sequence and generator, the `financial_transactions` table
//! and the `insert_financial_transaction` procedure.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(TABLE_SQL).await?;
        db.execute_unprepared(PROCEDURE_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP FUNCTION IF EXISTS insert_financial_transaction;
DROP TABLE IF EXISTS financial_transactions CASCADE;
DROP FUNCTION IF EXISTS next_financial_transaction_id;
DROP SEQUENCE IF EXISTS financial_transactions_seq;
",
        )
        .await?;
        Ok(())
    }
}

const TABLE_SQL: &str = r"
CREATE SEQUENCE financial_transactions_seq;

-- lpad alone would truncate ids past six digits
CREATE FUNCTION next_financial_transaction_id() RETURNS TEXT
LANGUAGE sql
AS $$
    SELECT 'FT' || CASE WHEN n < 1000000 THEN lpad(n::text, 6, '0') ELSE n::text END
    FROM (SELECT nextval('financial_transactions_seq') AS n) AS seq;
$$;

CREATE TABLE financial_transactions (
    id TEXT PRIMARY KEY DEFAULT next_financial_transaction_id(),
    descricao TEXT NOT NULL CHECK (btrim(descricao) <> ''),
    valor NUMERIC(14, 2) NOT NULL CHECK (valor > 0),
    tipo TEXT NOT NULL CHECK (tipo IN ('income', 'expense')),
    categoria TEXT NOT NULL CHECK (btrim(categoria) <> ''),
    status TEXT NOT NULL CHECK (status IN ('confirmed', 'pending', 'canceled')),
    data TIMESTAMPTZ NOT NULL,
    datavencimento TIMESTAMPTZ,
    datapagamento TIMESTAMPTZ,
    formapagamento TEXT CHECK (
        formapagamento IN ('cash', 'credit', 'debit', 'pix', 'bankSlip', 'transfer')
    ),
    observacoes TEXT,
    vinculoid TEXT,
    vinculotipo TEXT CHECK (vinculotipo IN ('sale', 'purchase')),
    comprovanteurl TEXT,
    linkvenda TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Listing order: newest business day first
CREATE INDEX idx_financial_transactions_data ON financial_transactions(data DESC);

-- Balance aggregation over confirmed rows
CREATE INDEX idx_financial_transactions_status_tipo ON financial_transactions(status, tipo);

-- Back-reference lookups from sales and purchases
CREATE INDEX idx_financial_transactions_vinculo ON financial_transactions(vinculoid)
    WHERE vinculoid IS NOT NULL;
";

/// Arguments follow the entity's writable columns in declaration order.
const PROCEDURE_SQL: &str = r"
CREATE OR REPLACE FUNCTION insert_financial_transaction(
    p_descricao TEXT,
    p_valor NUMERIC,
    p_tipo TEXT,
    p_categoria TEXT,
    p_status TEXT,
    p_data TIMESTAMPTZ,
    p_datavencimento TIMESTAMPTZ,
    p_datapagamento TIMESTAMPTZ,
    p_formapagamento TEXT,
    p_observacoes TEXT,
    p_vinculoid TEXT,
    p_vinculotipo TEXT,
    p_comprovanteurl TEXT,
    p_linkvenda TEXT
)
RETURNS SETOF financial_transactions
LANGUAGE sql
AS $$
    INSERT INTO financial_transactions (
        descricao, valor, tipo, categoria, status, data, datavencimento, datapagamento,
        formapagamento, observacoes, vinculoid, vinculotipo, comprovanteurl, linkvenda
    )
    VALUES (
        p_descricao, p_valor, p_tipo, p_categoria, p_status, p_data, p_datavencimento,
        p_datapagamento, p_formapagamento, p_observacoes, p_vinculoid, p_vinculotipo,
        p_comprovanteurl, p_linkvenda
    )
    RETURNING *;
$$;
";

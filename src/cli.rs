//! Interface de linha de comando do sapateiro baseada em clap.
//!
//! Define a struct [`Cli`] com os subcomandos [`Command`] e as flags globais
//! (`--api-url`, `--verbose`).

use clap::{Parser, Subcommand};

use crate::flow::SectorId;

/// sapateiro: acompanhamento de pedidos da oficina de calçados.
#[derive(Debug, Parser)]
#[command(name = "sapateiro", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// URL do backend, sobrepõe a configuração.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Autentica e guarda o token de sessão.
    Login {
        email: String,

        /// Senha. Se omitida, é lida da entrada padrão.
        #[arg(long)]
        password: Option<String>,
    },

    /// Mostra o quadro de status filtrado pelo departamento do usuário.
    Board {
        #[arg(long)]
        watch: bool,
    },

    /// Mostra o progresso de um pedido pelos setores do seu fluxo.
    Progress { pedido: String },

    /// Avança o pedido para o próximo setor do fluxo.
    Advance {
        pedido: String,

        /// Funcionário responsável pela movimentação.
        #[arg(long, short)]
        funcionario: String,

        #[arg(long)]
        observacao: Option<String>,
    },

    /// Move o pedido direto para um setor.
    Move {
        pedido: String,

        /// Id do setor, por exemplo `lavagem` ou `atendimento-final`.
        setor: SectorId,

        #[arg(long, short)]
        funcionario: String,

        #[arg(long)]
        observacao: Option<String>,
    },

    /// Muda o status (coluna do quadro) de um pedido.
    Status {
        pedido: String,
        status: String,

        #[arg(long, short)]
        funcionario: String,

        #[arg(long)]
        observacao: Option<String>,
    },

    /// Avanço rápido: busca por id ou CPF e move o pedido.
    Quick {
        /// Id do pedido ou CPF do cliente.
        query: String,

        /// `next`, `prev`, nome de uma coluna ou de um setor.
        #[arg(long, default_value = "next")]
        to: String,

        #[arg(long, short)]
        funcionario: String,
    },

    /// Estatísticas de pedidos por setor.
    Setores {
        #[arg(long)]
        watch: bool,
    },

    /// Pedidos atrasados e indicadores gerais.
    Atrasados,

    /// Lista os funcionários.
    Funcionarios {
        /// Filtra por id de setor.
        #[arg(long)]
        setor: Option<String>,

        #[arg(long, conflicts_with = "inativos")]
        ativos: bool,

        #[arg(long)]
        inativos: bool,
    },
}
